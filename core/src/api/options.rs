//! Configuration options for the compiler.

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use neoc_core::api::CompileOptions;
///
/// let options = CompileOptions {
///     prune_unused: false,
///     ..CompileOptions::default()
/// };
/// assert_eq!(options.entry_point, "Main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name of the entry function in the root package.
    ///
    /// Default: `"Main"`
    pub entry_point: String,

    /// Skip functions that are not reachable from the entry function.
    ///
    /// Default: `true`
    pub prune_unused: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            entry_point: String::from("Main"),
            prune_unused: true,
        }
    }
}
