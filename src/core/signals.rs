use crate::config::plot_config::PlotConfig;
use crate::domain::flavours::Flavour;
use std::collections::BTreeSet;

/// Signal flavours declared in the plot configuration.
pub fn get_signals(config: &PlotConfig) -> BTreeSet<Flavour> {
    config.declared_signals()
}

/// 依使用者要求篩選 signal
///
/// An empty request selects every declared signal. Otherwise the result is the
/// intersection with the declared set; requested flavours that are not declared
/// are dropped with a warning instead of failing.
pub fn resolve<S: AsRef<str>>(requested: &[S], config: &PlotConfig) -> BTreeSet<Flavour> {
    let declared = get_signals(config);
    if requested.is_empty() {
        return declared;
    }

    for name in requested {
        let name = name.as_ref();
        if !declared.iter().any(|f| f.name == name) {
            tracing::warn!(
                "⚠️ Requested signal '{}' is not declared in '{}', skipping it",
                name,
                config.config_name
            );
        }
    }

    declared
        .into_iter()
        .filter(|f| requested.iter().any(|r| r.as_ref() == f.name))
        .collect()
}
