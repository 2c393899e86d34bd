mod caching;
mod orchestration;
mod single_flight;
mod timeouts;
