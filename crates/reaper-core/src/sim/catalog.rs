//! Plugins known to the simulator
//!
//! Name resolution mimics REAPER's: case-insensitive, with or without the
//! `VST:`/`JS:` prefix and the vendor suffix.

use super::project::{Fx, FxParamState};

struct PluginDef {
    name: &'static str,
    aliases: &'static [&'static str],
    /// (name, default, min, max)
    params: &'static [(&'static str, f64, f64, f64)],
}

const PLUGINS: &[PluginDef] = &[
    PluginDef {
        name: "ReaEQ",
        aliases: &["VST: ReaEQ (Cockos)", "ReaEQ (Cockos)"],
        params: &[
            ("Freq-1", 200.0, 20.0, 24000.0),
            ("Gain-1", 0.0, -24.0, 24.0),
            ("Q-1", 2.0, 0.1, 4.0),
            ("Freq-2", 2000.0, 20.0, 24000.0),
            ("Gain-2", 0.0, -24.0, 24.0),
            ("Q-2", 2.0, 0.1, 4.0),
        ],
    },
    PluginDef {
        name: "ReaComp",
        aliases: &["VST: ReaComp (Cockos)", "ReaComp (Cockos)"],
        params: &[
            ("Thresh", 0.0, -60.0, 0.0),
            ("Ratio", 4.0, 1.0, 20.0),
            ("Attack", 3.0, 0.0, 500.0),
            ("Release", 100.0, 0.0, 5000.0),
        ],
    },
    PluginDef {
        name: "ReaSynth",
        aliases: &["VSTi: ReaSynth (Cockos)", "ReaSynth (Cockos)"],
        params: &[
            ("Volume", 0.5, 0.0, 1.0),
            ("Attack", 0.01, 0.0, 1.0),
            ("Decay", 0.1, 0.0, 1.0),
            ("Sustain", 0.8, 0.0, 1.0),
            ("Release", 0.2, 0.0, 1.0),
        ],
    },
    PluginDef {
        name: "ReaDelay",
        aliases: &["VST: ReaDelay (Cockos)", "ReaDelay (Cockos)"],
        params: &[
            ("Wet", 0.5, 0.0, 1.0),
            ("Dry", 1.0, 0.0, 1.0),
            ("Length (time)", 250.0, 0.0, 10000.0),
            ("Feedback", 0.3, 0.0, 1.0),
        ],
    },
    PluginDef {
        name: "ReaVerbate",
        aliases: &["VST: ReaVerbate (Cockos)", "ReaVerbate (Cockos)"],
        params: &[
            ("Wet", 0.3, 0.0, 1.0),
            ("Dry", 1.0, 0.0, 1.0),
            ("Room size", 0.5, 0.0, 1.0),
            ("Dampening", 0.5, 0.0, 1.0),
        ],
    },
];

/// Instantiate a plugin by name, `None` if it is unknown
pub fn resolve(query: &str) -> Option<Fx> {
    let query = query.trim();
    PLUGINS
        .iter()
        .find(|p| {
            p.name.eq_ignore_ascii_case(query)
                || p.aliases.iter().any(|a| a.eq_ignore_ascii_case(query))
        })
        .map(|p| Fx {
            name: p.name.to_string(),
            params: p
                .params
                .iter()
                .map(|&(name, value, min, max)| FxParamState {
                    name: name.to_string(),
                    value,
                    min,
                    max,
                })
                .collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name_and_alias() {
        assert_eq!(resolve("reaeq").map(|fx| fx.name), Some("ReaEQ".to_string()));
        assert_eq!(
            resolve("VST: ReaEQ (Cockos)").map(|fx| fx.name),
            Some("ReaEQ".to_string())
        );
        assert!(resolve("NotARealPlugin").is_none());
    }

    #[test]
    fn test_params_start_at_defaults() {
        let fx = resolve("ReaComp").unwrap();
        assert_eq!(fx.params[1].name, "Ratio");
        assert_eq!(fx.params[1].value, 4.0);
    }
}
