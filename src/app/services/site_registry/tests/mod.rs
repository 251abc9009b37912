//! Tests for the site registry service
