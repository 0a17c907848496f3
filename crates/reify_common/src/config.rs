use std::path::PathBuf;

/// Settings for the Java companion and statement emitter.
#[derive(Clone, Debug)]
pub struct JavaConfig {
    /// The package declared by emitted files. `None` emits into the default package.
    pub package: Option<String>,
    pub indent_width: u32,
    /// The package providing `Util` and `Array` to the emitted code.
    pub runtime_package: String,
}

impl Default for JavaConfig {
    fn default() -> Self {
        JavaConfig {
            package: None,
            indent_width: 4,
            runtime_package: "reify.lang".to_owned(),
        }
    }
}

/// When the erasure pass materializes a boxed adapter for a native array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdapterPolicy {
    /// A fresh adapter at every use that demands a generic value.
    PerUse,
    /// At most one adapter per array local, created at its first demanding use.
    #[default]
    Shared,
}

#[derive(Clone, Debug, Default)]
pub struct EraseOptions {
    pub adapter_policy: AdapterPolicy,
}

#[derive(Clone, Debug, Default)]
pub struct BuildConfig {
    pub java: JavaConfig,
    pub erase: EraseOptions,
    /// Directory to write emitted files into. Emitted to stdout if absent.
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(AdapterPolicy::default(), AdapterPolicy::Shared);
        let config = BuildConfig::default();
        assert_eq!(config.erase.adapter_policy, AdapterPolicy::Shared);
        assert_eq!(config.output_dir, None);
        assert_eq!(config.java.indent_width, 4);
        assert_eq!(config.java.runtime_package, "reify.lang");
    }
}
