//! Database test suite.
