pub mod pdb;
pub mod xyz;
