//! Shared fixtures for tenet-ops unit tests.
