//! Shared test utilities for tenet-db unit tests.
