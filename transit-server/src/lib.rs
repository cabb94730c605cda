//! Transit route server.
//!
//! A web application that answers: "what is the cheapest way from this
//! stop to that one?" over a graph built from a GTFS feed, using weighted
//! A* search.

pub mod config;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod web;
