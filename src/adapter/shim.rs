//! Bootstrap shim that swaps one source file for its mutated version.
//!
//! The generated PHP runs as the runner's `--bootstrap`. It first chains to
//! the project's own bootstrap, then arms the include interceptor so that any
//! later `include` of the original file loads the mutant instead.

use std::path::{Path, PathBuf};

use super::config::RunnerConfig;

/// Logical name an enclosing Infection archive is re-mounted under.
pub const BUNDLE_ALIAS: &str = "infection.phar";

const BUNDLE_SCHEME: &str = "phar://";
const INTERCEPTOR_CLASS: &str = "Infection\\StreamWrapper\\IncludeInterceptor";

/// Where the include interceptor implementation lives at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorRuntime {
    /// Path of `IncludeInterceptor.php`, possibly a `phar://` URL.
    pub interceptor_path: String,
    /// Namespace prefix of a scoped build, e.g. `_HumbugBox123\`. Empty when unscoped.
    pub namespace_prefix: String,
}

impl Default for InterceptorRuntime {
    fn default() -> Self {
        Self {
            interceptor_path: "vendor/infection/include-interceptor/src/IncludeInterceptor.php"
                .to_string(),
            namespace_prefix: String::new(),
        }
    }
}

impl InterceptorRuntime {
    /// Interceptor at `path`, unscoped.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            interceptor_path: path.into(),
            namespace_prefix: String::new(),
        }
    }

    /// Set the scoped namespace prefix. A trailing `\` is added when missing.
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('\\') {
            prefix.push('\\');
        }
        self.namespace_prefix = prefix;
        self
    }

    /// The archive the interceptor was loaded from, if any.
    ///
    /// `phar:///opt/infection.phar/src/IncludeInterceptor.php` yields
    /// `/opt/infection.phar`.
    pub fn running_bundle(&self) -> Option<&str> {
        let inner = self.interceptor_path.strip_prefix(BUNDLE_SCHEME)?;
        match inner.find(".phar") {
            Some(idx) => Some(&inner[..idx + ".phar".len()]),
            None => Some(inner),
        }
    }
}

/// Renders interceptor shims for one project.
#[derive(Debug, Clone)]
pub struct ShimGenerator {
    project_dir: PathBuf,
    interceptor: InterceptorRuntime,
}

impl ShimGenerator {
    /// Generator for shims of the project at `project_dir`.
    ///
    /// A relative interceptor path is taken relative to `project_dir`, so the
    /// shim does not depend on the runner's working directory.
    pub fn new(project_dir: impl Into<PathBuf>, mut interceptor: InterceptorRuntime) -> Self {
        let project_dir = project_dir.into();
        if !is_absolute_path(&interceptor.interceptor_path) {
            interceptor.interceptor_path = format!(
                "{}/{}",
                project_dir.display(),
                interceptor.interceptor_path
            );
        }
        Self {
            project_dir,
            interceptor,
        }
    }

    /// Full PHP source of the bootstrap shim for one mutant.
    pub fn build_interceptor_script(
        &self,
        original_file_path: &str,
        mutated_file_path: &str,
        config: &RunnerConfig,
    ) -> String {
        let bootstrap = self
            .original_bootstrap_path(config)
            .map(|path| format!("require_once {};", php_string(&path)))
            .unwrap_or_default();

        format!(
            "<?php\n\n{bootstrap}\n{}\n",
            self.interceptor_fragment(original_file_path, mutated_file_path)
        )
    }

    /// Project bootstrap to chain to, resolved against the tests directory
    /// when relative.
    pub fn original_bootstrap_path(&self, config: &RunnerConfig) -> Option<String> {
        let bootstrap = config.bootstrap()?;
        if is_absolute_path(bootstrap) {
            return Some(bootstrap.to_string());
        }

        Some(format!(
            "{}/{}/{}",
            self.project_dir.display(),
            config.tests_dir(),
            bootstrap
        ))
    }

    fn interceptor_fragment(&self, original_file_path: &str, mutated_file_path: &str) -> String {
        let bundle = self
            .interceptor
            .running_bundle()
            .map(|bundle| {
                format!(
                    "\\Phar::loadPhar({}, {});",
                    php_string(bundle),
                    php_string(BUNDLE_ALIAS)
                )
            })
            .unwrap_or_default();

        format!(
            "{bundle}\n\
             require_once {interceptor};\n\
             \n\
             use {prefix}{INTERCEPTOR_CLASS};\n\
             \n\
             IncludeInterceptor::intercept({original}, {mutated});\n\
             IncludeInterceptor::enable();",
            interceptor = php_string(&self.interceptor.interceptor_path),
            prefix = self.interceptor.namespace_prefix,
            original = php_string(original_file_path),
            mutated = php_string(mutated_file_path),
        )
    }
}

/// Absolute on either platform: `/x`, `\x`, `C:\x`, `C:/x`, or a stream URL.
fn is_absolute_path(path: &str) -> bool {
    if Path::new(path).is_absolute() || path.starts_with('/') || path.starts_with('\\') {
        return true;
    }

    let bytes = path.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\');

    drive || path.contains("://")
}

/// Single-quoted PHP literal.
fn php_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> RunnerConfig {
        RunnerConfig::from_yaml_str(yaml, Path::new("codeception.yml"))
            .expect("test config should parse")
    }

    fn generator() -> ShimGenerator {
        ShimGenerator::new(
            "/project",
            InterceptorRuntime::new("/opt/infection/src/IncludeInterceptor.php"),
        )
    }

    #[test]
    fn shim_without_bootstrap_has_no_require_of_it() {
        let script = generator().build_interceptor_script(
            "/original/file/path",
            "/mutated/file/path",
            &config("actor_suffix: Tester\n"),
        );

        assert!(script.starts_with("<?php\n"));
        assert!(!script.contains("bootstrap"));
        assert_eq!(script.matches("require_once").count(), 1);
        assert!(script.contains("require_once '/opt/infection/src/IncludeInterceptor.php';"));
        assert!(script.contains("use Infection\\StreamWrapper\\IncludeInterceptor;"));
        assert!(script.contains(
            "IncludeInterceptor::intercept('/original/file/path', '/mutated/file/path');"
        ));
        assert!(script.trim_end().ends_with("IncludeInterceptor::enable();"));
        assert!(!script.contains("Phar::loadPhar"));
    }

    #[test]
    fn absolute_bootstrap_is_required_verbatim() {
        let script = generator().build_interceptor_script(
            "/o.php",
            "/m.php",
            &config("bootstrap: /a/b.php\n"),
        );

        assert!(script.contains("require_once '/a/b.php';"));
    }

    #[test]
    fn relative_bootstrap_resolves_through_tests_dir() {
        let script = generator().build_interceptor_script(
            "/o.php",
            "/m.php",
            &config("bootstrap: c/d.php\npaths:\n    tests: tests\n"),
        );
        assert!(script.contains("require_once '/project/tests/c/d.php';"));

        let custom = generator().build_interceptor_script(
            "/o.php",
            "/m.php",
            &config("bootstrap: c/d.php\npaths:\n    tests: qa\n"),
        );
        assert!(custom.contains("require_once '/project/qa/c/d.php';"));
    }

    #[test]
    fn bootstrap_runs_before_interceptor_is_armed() {
        let script = generator().build_interceptor_script(
            "/o.php",
            "/m.php",
            &config("bootstrap: /a/b.php\n"),
        );

        let bootstrap_at = script.find("'/a/b.php'").expect("bootstrap present");
        let interceptor_at = script.find("IncludeInterceptor.php").expect("interceptor present");
        let enable_at = script.find("enable()").expect("enable present");
        assert!(bootstrap_at < interceptor_at);
        assert!(interceptor_at < enable_at);
    }

    #[test]
    fn bundled_interceptor_remounts_archive_first() {
        let interceptor = InterceptorRuntime::new(
            "phar:///usr/local/bin/infection.phar/vendor/infection/include-interceptor/src/IncludeInterceptor.php",
        )
        .with_namespace_prefix("_HumbugBox9c1");
        assert_eq!(
            interceptor.running_bundle(),
            Some("/usr/local/bin/infection.phar")
        );

        let script = ShimGenerator::new("/project", interceptor).build_interceptor_script(
            "/o.php",
            "/m.php",
            &RunnerConfig::default(),
        );

        let load_at = script
            .find("\\Phar::loadPhar('/usr/local/bin/infection.phar', 'infection.phar');")
            .expect("bundle should be re-mounted");
        let require_at = script.find("require_once").expect("require present");
        assert!(load_at < require_at);
        assert!(script.contains("use _HumbugBox9c1\\Infection\\StreamWrapper\\IncludeInterceptor;"));
    }

    #[test]
    fn quotes_are_escaped_in_literals() {
        let script = generator().build_interceptor_script(
            "/src/it's.php",
            "C:\\tmp\\m.php",
            &RunnerConfig::default(),
        );

        assert!(script.contains(r"'/src/it\'s.php'"));
        assert!(script.contains(r"'C:\\tmp\\m.php'"));
    }

    #[test]
    fn relative_interceptor_resolves_against_project() {
        let script = ShimGenerator::new("/project", InterceptorRuntime::default())
            .build_interceptor_script("/o.php", "/m.php", &RunnerConfig::default());

        assert!(script.contains(
            "require_once '/project/vendor/infection/include-interceptor/src/IncludeInterceptor.php';"
        ));
    }

    #[test]
    fn recognizes_windows_and_stream_paths_as_absolute() {
        assert!(is_absolute_path("C:\\project\\bootstrap.php"));
        assert!(is_absolute_path("D:/project/bootstrap.php"));
        assert!(is_absolute_path("\\\\server\\share\\b.php"));
        assert!(is_absolute_path("vfs://root/b.php"));
        assert!(!is_absolute_path("_bootstrap.php"));
        assert!(!is_absolute_path("c/d.php"));
    }
}
