pub mod ntr;
