use fileio::module::{DirExporter, Exporter, PropExporter};
use fileio::{FileIoError, Object, Runtime, Value, init};

#[test]
fn test_init_exports_entry_points() {
    let mut rt = Runtime::new().unwrap();

    let mut keys = rt.run(|env| init(env).unwrap().keys());
    keys.sort();

    assert_eq!(keys, vec!["opendirSync", "rmdir", "rmdirSync"]);
}

#[test]
fn test_init_returns_fresh_tables() {
    let mut rt = Runtime::new().unwrap();

    rt.run(|env| {
        let first = init(env).unwrap();
        let second = init(env).unwrap();
        assert!(!first.ptr_eq(&second));
        assert!(second.has_prop("rmdir"));
    });
}

#[test]
fn test_exporter_refuses_taken_name() {
    let exports = Object::new();
    assert!(exports.add_prop("opendirSync", Value::Null));

    let err = DirExporter.export(&exports).unwrap_err();
    assert_eq!(
        err,
        FileIoError::Export {
            class: "Dir".to_string()
        }
    );
    assert_eq!(err.errno(), libc::EINVAL);
}

#[test]
fn test_exporters_share_one_table() {
    let exports = Object::new();

    PropExporter.export(&exports).unwrap();
    DirExporter.export(&exports).unwrap();

    assert!(exports.has_prop("rmdirSync"));
    assert!(exports.has_prop("opendirSync"));
    assert!(PropExporter.export(&exports).is_err());
}
