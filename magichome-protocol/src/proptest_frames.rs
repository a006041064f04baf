//! Property tests for frame encoding.
//!
//! These check the properties every transmitted frame must satisfy for any
//! channel values, not just the hand-picked vectors in the unit tests.
