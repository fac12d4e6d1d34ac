pub mod flat_ref;
