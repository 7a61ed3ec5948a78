pub mod orbit_graph;
