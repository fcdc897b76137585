// Scoring engine adapter — read-only client over the competition scoring API.
//
// The scoring engine is the source of truth for teams, flags, and scores.
// Each submodule handles one area: the typed HTTP client, the push event
// stream, and the pass-scoped score/flag snapshots.

pub mod client;
pub mod events;
pub mod snapshot;
pub mod traits;
