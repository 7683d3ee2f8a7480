//! Module registration.
//!
//! [`init`] is called once by the host when the module loads. It builds the
//! export table by running every [`Exporter`] against it and returns the table;
//! nothing is registered through process-wide state.
//!
//! # Example
//!
//! ```ignore
//! let mut rt = Runtime::new()?;
//! rt.run(|env| {
//!     let exports = fileio::init(env)?;
//!     assert!(exports.has_prop("rmdir"));
//!     Ok::<_, fileio::Exception>(())
//! })?;
//! ```

pub mod dir_class;
pub mod rmdirent;

use crate::error::FileIoError;
use crate::host::{Function, HostResult, Object, PropertyDescriptor};
use crate::runtime::Env;

use tracing::{debug, error};

/// A group of functions or a class installed on the export table.
pub trait Exporter {
    /// Installs this exporter's properties on `exports`.
    fn export(&self, exports: &Object) -> Result<(), FileIoError>;

    /// Name used in logs and registration errors.
    fn class_name(&self) -> &str;
}

/// Free functions of the module.
pub struct PropExporter;

impl Exporter for PropExporter {
    fn export(&self, exports: &Object) -> Result<(), FileIoError> {
        let functions = [
            ("rmdir", Function::new("rmdir", rmdirent::rmdir)),
            ("rmdirSync", Function::new("rmdirSync", rmdirent::rmdir_sync)),
        ];

        for (name, function) in functions {
            if exports.has_prop(name) {
                return Err(FileIoError::Export {
                    class: format!("{}.{}", self.class_name(), name),
                });
            }

            exports.define_properties(vec![PropertyDescriptor::function(name, function)]);
        }

        Ok(())
    }

    fn class_name(&self) -> &str {
        "FileIO"
    }
}

/// The `Dir` class and its factory.
pub struct DirExporter;

impl Exporter for DirExporter {
    fn export(&self, exports: &Object) -> Result<(), FileIoError> {
        let opendir = Function::new("opendirSync", dir_class::opendir_sync);

        if !exports.add_prop("opendirSync", opendir.into()) {
            return Err(FileIoError::Export {
                class: self.class_name().to_string(),
            });
        }

        Ok(())
    }

    fn class_name(&self) -> &str {
        dir_class::CLASS_NAME
    }
}

/// Builds and returns the module's export table.
pub fn init(env: &Env) -> HostResult<Object> {
    let exports = Object::new();
    let exporters: Vec<Box<dyn Exporter>> = vec![Box::new(PropExporter), Box::new(DirExporter)];

    for exporter in &exporters {
        if let Err(err) = exporter.export(&exports) {
            error!(class = exporter.class_name(), error = %err, "export failed");
            return Err(err.throw(env));
        }

        debug!(class = exporter.class_name(), "class exported");
    }

    Ok(exports)
}
