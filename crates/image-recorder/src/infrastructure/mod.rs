pub mod emitter;
pub mod k8s;
