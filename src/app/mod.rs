// Application layer: concrete pipelines wired to the ports.

pub mod pipelines;
