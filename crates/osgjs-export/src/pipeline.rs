//! Export pipeline: private copy, gated pre-passes, encode, write

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use osgjs_core::{Error, Result, ResultExt};
use osgjs_scene::Node;
use tracing::{debug, info, instrument};

use crate::document::Document;
use crate::options::ExportOptions;
use crate::visitor::encode;
use crate::writer::DocumentWriter;

/// File extension of osgjs documents
pub const EXTENSION: &str = "osgjs";

/// A geometry pre-processing pass run on the private copy of the graph
/// before encoding
pub trait GraphPass {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Rewrite the graph in place
    fn run(&mut self, root: &mut Node, options: &ExportOptions) -> Result<()>;
}

/// Runs the configured passes and writes osgjs documents
///
/// The caller's graph is never modified: passes work on a deep copy that
/// keeps the sharing of the original.
pub struct Exporter {
    options: ExportOptions,
    wireframe: Option<Box<dyn GraphPass>>,
    tangent_space: Option<Box<dyn GraphPass>>,
    optimizer: Option<Box<dyn GraphPass>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::with_options(ExportOptions::default())
    }
}

impl Exporter {
    /// Create a new exporter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create exporter with custom options
    pub fn with_options(options: ExportOptions) -> Self {
        Self {
            options,
            wireframe: None,
            tangent_space: None,
            optimizer: None,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Pass run when `enable_wireframe` is set
    pub fn with_wireframe_pass(mut self, pass: impl GraphPass + 'static) -> Self {
        self.wireframe = Some(Box::new(pass));
        self
    }

    /// Pass run when `generate_tangent_space` is set and wireframe is not
    pub fn with_tangent_space_pass(mut self, pass: impl GraphPass + 'static) -> Self {
        self.tangent_space = Some(Box::new(pass));
        self
    }

    /// Geometry optimizer, always run when registered
    pub fn with_optimizer_pass(mut self, pass: impl GraphPass + 'static) -> Self {
        self.optimizer = Some(Box::new(pass));
        self
    }

    /// Copy the graph and run the gated passes on the copy
    pub fn prepare(&mut self, root: &Node) -> Result<Node> {
        let mut model = root.deep_clone();
        let options = &self.options;

        let passes = [
            (options.runs_wireframe(), self.wireframe.as_deref_mut()),
            (options.runs_tangent_space(), self.tangent_space.as_deref_mut()),
            (true, self.optimizer.as_deref_mut()),
        ];
        for (enabled, pass) in passes {
            let Some(pass) = pass else { continue };
            if !enabled {
                debug!(pass = pass.name(), "Pass disabled by options");
                continue;
            }
            debug!(pass = pass.name(), "Running pass");
            pass.run(&mut model, options)
                .with_context(|| format!("running pass {}", pass.name()))?;
        }
        Ok(model)
    }

    /// Prepare and encode a graph
    #[instrument(skip_all, fields(root = %root.name))]
    pub fn export(&mut self, root: &Node) -> Result<Document> {
        let model = self.prepare(root)?;
        encode(&model)
    }

    /// Encode a graph and write the document to a stream
    pub fn write_node<W: Write>(&mut self, root: &Node, writer: W) -> Result<()> {
        let document = self.export(root)?;
        DocumentWriter::with_pretty(self.options.pretty).write(&document, writer)
    }

    /// Encode a graph and write it to an `.osgjs` file
    pub fn write_file(&mut self, root: &Node, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let handled = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
        if !handled {
            return Err(Error::invalid_config(format!(
                "{} is not an .{EXTENSION} file",
                path.display()
            )));
        }

        let document = self.export(root)?;
        let file = File::create(path)
            .map_err(Error::from)
            .with_context(|| format!("creating {}", path.display()))?;
        DocumentWriter::with_pretty(self.options.pretty)
            .write(&document, BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), "Wrote osgjs document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the order in which passes ran
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl GraphPass for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&mut self, root: &mut Node, _options: &ExportOptions) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            root.name = format!("{}+{}", root.name, self.name);
            Ok(())
        }
    }

    fn exporter(options: ExportOptions, log: &Arc<Mutex<Vec<&'static str>>>) -> Exporter {
        let pass = |name| Recorder { name, log: Arc::clone(log) };
        Exporter::with_options(options)
            .with_wireframe_pass(pass("wireframe"))
            .with_tangent_space_pass(pass("tangent"))
            .with_optimizer_pass(pass("optimizer"))
    }

    #[test]
    fn test_default_runs_optimizer_only() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let root = Node::group().named("root");
        let model = exporter(ExportOptions::default(), &log).prepare(&root).unwrap();

        assert_eq!(*log.lock().unwrap(), ["optimizer"]);
        assert_eq!(model.name, "root+optimizer");
        assert_eq!(root.name, "root");
    }

    #[test]
    fn test_wireframe_suppresses_tangent_space() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let options = ExportOptions::new().with_tangent_space(0).with_wireframe(true);
        exporter(options, &log).prepare(&Node::group()).unwrap();
        assert_eq!(*log.lock().unwrap(), ["wireframe", "optimizer"]);
    }

    #[test]
    fn test_tangent_space_runs_before_optimizer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let options = ExportOptions::new().with_tangent_space(1);
        exporter(options, &log).prepare(&Node::group()).unwrap();
        assert_eq!(*log.lock().unwrap(), ["tangent", "optimizer"]);
    }

    #[test]
    fn test_write_file_rejects_extension() {
        let err = Exporter::new().write_file(&Node::group(), "scene.json").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
