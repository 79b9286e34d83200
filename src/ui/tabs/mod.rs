pub mod notas;
pub mod reprocess;
