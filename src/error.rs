use std::{io, path::PathBuf};
use thiserror::Error;

/// Tipo de retorno conveniente para todo o projeto
pub type InformeResult<T> = Result<T, InformeError>;

#[derive(Error, Debug)]
pub enum InformeError {
    #[error("Erro na leitura da planilha <{arquivo:?}>: {source}")]
    Calamine {
        #[source]
        source: calamine::Error,
        arquivo: PathBuf,
    },

    #[error("CNPJ da fonte pagadora com dígito verificador incorreto: {cnpj}")]
    CnpjDigitoVerificador { cnpj: String },

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro no processamento CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(
        "Formato de arquivo não suportado: <{arquivo:?}>\n\
        Extensões aceitas: .xlsx, .xlsm, .xls, .xlsb, .ods e .csv"
    )]
    FormatoNaoSuportado { arquivo: PathBuf },

    #[error("CNPJ inválido: {cnpj}. Esperado 14 dígitos, encontrado {length}")]
    InvalidCnpj { cnpj: String, length: usize },

    #[error("Erro de I/O: {0}")]
    Io(#[from] io::Error),

    #[error(
        "Arquivo não encontrado!\n\
        Arquivo: {arquivo:?}\n\
        {source}"
    )]
    IoReader {
        #[source] // Indica que este é o erro original
        source: io::Error,
        arquivo: PathBuf,
    },

    #[error(
        "Natureza de rendimento {codigo} ({descricao}) é isenta e não possui código de receita para DARF"
    )]
    NaturezaIsenta {
        codigo: &'static str,
        descricao: &'static str,
    },

    #[error("Natureza de rendimento desconhecida: <{0}>")]
    NaturezaDesconhecida(String),

    #[error(
        "Nenhuma planilha de rendimentos encontrada no diretório!\n\
        Exemplo:\n\
        informe_rendimentos --cnpj 00.621.930/0001-62 --responsavel 'Fulano' 'Rendimentos 2025.xlsx'"
    )]
    NoSpreadsheetFound,

    #[error("Período de apuração do DARF inválido: <{0}>. Formato esperado: MM/AAAA")]
    PeriodoDarfInvalido(String),

    #[error("Planilha <{arquivo:?}> inválida: {mensagem}")]
    Planilha { arquivo: PathBuf, mensagem: String },

    #[error(
        "Razão social não informada e CNPJ {cnpj} ausente do cadastro local.\n\
        Informe o nome empresarial com --razao-social"
    )]
    RazaoSocialNaoEncontrada { cnpj: String },

    #[error("Ação <{acao}> não permitida na etapa <{etapa}>")]
    TransicaoInvalida {
        etapa: &'static str,
        acao: &'static str,
    },

    #[error("Valor negativo para {campo}: {valor}")]
    ValorNegativo { campo: &'static str, valor: f64 },

    #[error("Data de vencimento do DARF inválida: <{0}>. Formato esperado: DD/MM/AAAA")]
    VencimentoInvalido(String),
}

impl InformeError {
    pub fn from_calamine(e: calamine::Error, arquivo: PathBuf) -> Self {
        // Arquivos inexistentes chegam como erro de I/O dentro do calamine
        if let calamine::Error::Io(io_err) = e {
            return InformeError::IoReader {
                source: io_err,
                arquivo,
            };
        }
        InformeError::Calamine { source: e, arquivo }
    }
}
