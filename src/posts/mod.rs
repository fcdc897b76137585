// Post definitions — declarative templates describing what to publish,
// to whom, and under what trigger.

pub mod definition;
pub mod template;
pub mod trigger;
