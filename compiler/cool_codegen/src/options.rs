//! Code generation options.

/// Environment variable enabling per-node `;` annotations in the IR.
pub const ANNOTATE_ENV: &str = "COOL_CGEN_ANNOTATE";

/// Knobs for a single [`generate`](crate::generate) run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Class instantiated by the program entry point.
    pub entry_class: String,
    /// Method invoked on the entry instance.
    pub entry_method: String,
    /// Print `Main.main() returned %d` when the entry method returns `Int`.
    pub report_main_result: bool,
    /// Emit a `; <node>` comment before every lowered expression.
    pub annotate: bool,
}

impl CodegenOptions {
    /// Defaults, with `annotate` switched on by `COOL_CGEN_ANNOTATE`.
    pub fn from_env() -> Self {
        let annotate = std::env::var(ANNOTATE_ENV).is_ok_and(|v| !v.is_empty());
        Self {
            annotate,
            ..Self::default()
        }
    }
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            entry_class: "Main".to_string(),
            entry_method: "main".to_string(),
            report_main_result: true,
            annotate: false,
        }
    }
}
