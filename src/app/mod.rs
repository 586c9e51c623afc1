// Application layer: the concrete steps run against each library subproject.

pub mod steps;
