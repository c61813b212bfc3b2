mod agregador;
mod args;
mod darf;
mod documento;
mod error;
mod fluxo;
mod informe;
mod metadata;
mod periodo;
mod planilha;
mod regex;
mod relatorio;

pub mod logging;

pub use self::{
    agregador::*, args::*, darf::*, documento::*, error::*, fluxo::*, informe::*, metadata::*,
    periodo::*, planilha::*, regex::*, relatorio::*,
};
