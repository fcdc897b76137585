// Template substitution for post titles and bodies.
//
// Two built-in placeholders are replaced first by literal substitution:
// %{team_name} (display name) and %{team_score} (cumulative score at the
// time of the pass). Every remaining %{name} placeholder is looked up in
// the definition's per-team variable tables. A missing variable or a
// missing team entry substitutes the empty string — this is the intended
// silent-default policy, not an error path: definitions routinely carry
// variables for only a subset of teams.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex_lite::{Captures, Regex};

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"%\{([A-Za-z0-9_]+)\}").unwrap())
}

/// Render a template for one team.
pub fn render(
    template: &str,
    team_name: &str,
    team_score: i64,
    team_external_id: i64,
    variables: &HashMap<String, HashMap<i64, String>>,
) -> String {
    let text = template
        .replace("%{team_name}", team_name)
        .replace("%{team_score}", &team_score.to_string());

    placeholder()
        .replace_all(&text, |caps: &Captures| {
            variables
                .get(&caps[1])
                .and_then(|per_team| per_team.get(&team_external_id))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}
