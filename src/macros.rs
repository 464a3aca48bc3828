/// Fully qualified name of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Log at an explicit level: `log!(logger, Level::Info, "y {}", 5)`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, $crate::__function_name!(), ::core::format_args!($($arg)+))
    };
}

/// Log at trace level: `trace!(logger, "fmt", args...)`.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log at debug level: `debug!(logger, "fmt", args...)`.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log at info level: `info!(logger, "fmt", args...)`.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log at warn level to the `.wf.log` stream.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log at error level to the `.wf.log` stream.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log at fatal level to the `.wf.log` stream. Does not terminate the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::{FileLogConfig, FileLogger, Level};

    #[test]
    fn test_function_name() {
        let name = crate::__function_name!();
        assert_eq!(name, "splitlog::macros::tests::test_function_name");
    }

    #[test]
    fn test_macros_record_function_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(FileLogConfig::new(dir.path(), "svc", Level::Trace)).unwrap();

        let line = line!() + 1;
        crate::info!(logger, "y {}", 5);
        crate::fatal!(&logger, "down");
        logger.close();

        let main = std::fs::read_to_string(logger.main_path()).unwrap();
        let expected = format!(
            "[INFO] [macros.rs:test_macros_record_function_and_line:{}] y 5\n",
            line
        );
        assert!(main.ends_with(&expected), "{}", main);

        let warn = std::fs::read_to_string(logger.warn_path()).unwrap();
        assert!(warn.contains("[FATAL] [macros.rs:test_macros_record_function_and_line:"));
    }
}
