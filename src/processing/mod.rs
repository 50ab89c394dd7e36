pub mod median_filter;
pub mod oscillations;
pub mod spectral;
pub mod spikes;
pub mod stalls;
pub mod statistics;
pub mod window;
