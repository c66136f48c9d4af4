//! Caller-location resolution for log records.
//!
//! Every record names the file, line and function it was logged from. The
//! logging macros capture all three at the call site; the plain methods rely
//! on `#[track_caller]` and only know the file and line. A [`FrameResolver`]
//! turns that raw [`CallSite`] into the [`CallerInfo`] written to the file,
//! and can be swapped for [`FixedResolver`] when output must be
//! deterministic.

use std::{fmt, panic::Location, path::Path};

/// Raw location of a log call as seen by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// Fully qualified path of the enclosing function, when known.
    pub function: Option<&'static str>,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, function: Option<&'static str>) -> Self {
        Self { file, line, function }
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), None)
    }
}

/// Caller details rendered into a record as `[file:line][function]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}][{}]", self.file, self.line, self.function)
    }
}

/// Turns a call site into the caller details of a record.
pub trait FrameResolver: Send + Sync {
    fn resolve(&self, site: &CallSite) -> CallerInfo;
}

/// Default resolver: base name of the source file and the last two segments
/// of the function path (`module::function`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceResolver;

impl SourceResolver {
    fn short_function(path: &str) -> String {
        let path = path.trim_end_matches("::{{closure}}");
        let segments: Vec<&str> = path.rsplitn(3, "::").collect();
        match segments.as_slice() {
            [name, module, _] | [name, module] => format!("{module}::{name}"),
            _ => path.to_string(),
        }
    }
}

impl FrameResolver for SourceResolver {
    fn resolve(&self, site: &CallSite) -> CallerInfo {
        let file = Path::new(site.file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| site.file.to_string());
        CallerInfo {
            file,
            line: site.line,
            function: site.function.map_or_else(|| "?".to_string(), Self::short_function),
        }
    }
}

/// Resolver that ignores the call site and always reports the same caller.
#[derive(Debug, Clone)]
pub struct FixedResolver {
    info: CallerInfo,
}

impl FixedResolver {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            info: CallerInfo {
                file: file.into(),
                line,
                function: function.into(),
            },
        }
    }
}

impl FrameResolver for FixedResolver {
    fn resolve(&self, _site: &CallSite) -> CallerInfo {
        self.info.clone()
    }
}

/// Expands to the fully qualified path of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_path {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        match name.strip_suffix("::f") {
            Some(stripped) => stripped,
            None => name,
        }
    }};
}

/// Expands to the [`CallSite`] of the macro invocation.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), Some($crate::__function_path!()))
    };
}
