//! Lowering tests over whole programs, asserting on the emitted IR text.


mod control_flow;
mod names;
mod objects;
