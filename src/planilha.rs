use calamine::{Data, Reader, open_workbook_auto};
use std::{
    borrow::Cow,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{COLUNA_NOME, InformeError, InformeResult, MARCADORES_CABECALHO};

/// Valor de uma célula da planilha, normalizado na fronteira de leitura.
#[derive(Debug, Clone, PartialEq)]
pub enum Celula {
    Numero(f64),
    Texto(String),
    Vazia,
}

/// Uma linha é a sequência ordenada de células da planilha.
pub type Linha = Vec<Celula>;

impl Celula {
    /// Representação textual da célula.
    ///
    /// Números inteiros não recebem casas decimais (`11144477735.0` -> `"11144477735"`).
    pub fn texto(&self) -> Cow<'_, str> {
        match self {
            Celula::Numero(valor) => Cow::Owned(valor.to_string()),
            Celula::Texto(texto) => Cow::Borrowed(texto),
            Celula::Vazia => Cow::Borrowed(""),
        }
    }

    pub fn is_vazia(&self) -> bool {
        match self {
            Celula::Vazia => true,
            Celula::Texto(texto) => texto.is_empty(),
            Celula::Numero(_) => false,
        }
    }
}

impl From<&str> for Celula {
    fn from(texto: &str) -> Self {
        if texto.trim().is_empty() {
            Celula::Vazia
        } else {
            Celula::Texto(texto.to_string())
        }
    }
}

impl From<f64> for Celula {
    fn from(valor: f64) -> Self {
        Celula::Numero(valor)
    }
}

impl From<&Data> for Celula {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(valor) => Celula::Numero(*valor as f64),
            Data::Float(valor) => Celula::Numero(*valor),
            // Datas do Excel são números seriais (dias desde 1899-12-30)
            Data::DateTime(data_hora) => Celula::Numero(data_hora.as_f64()),
            Data::String(texto) | Data::DateTimeIso(texto) | Data::DurationIso(texto) => {
                Celula::from(texto.as_str())
            }
            Data::Bool(valor) => Celula::Texto(valor.to_string()),
            Data::Error(_) | Data::Empty => Celula::Vazia,
        }
    }
}

/// Retorna a célula da coluna indicada.
/// Linhas curtas se comportam como se as células ausentes estivessem vazias.
pub fn celula(linha: &[Celula], coluna: usize) -> &Celula {
    linha.get(coluna).unwrap_or(&Celula::Vazia)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoDeLinha {
    Dados,
    Cabecalho,
    Vazia,
}

/// Classifica a linha pelo conteúdo da coluna do nome.
///
/// Não depende da posição da linha: cabeçalhos e rodapés são reconhecidos
/// pelos marcadores "Nome" e "Proprietário".
///
/// ```
/// use informe_rendimentos::{Celula, TipoDeLinha, classificar_linha};
///
/// let cabecalho: Vec<Celula> = ["", "", "", "Nome do Beneficiário"].map(Celula::from).to_vec();
/// let dados: Vec<Celula> = ["", "", "", "MARIA"].map(Celula::from).to_vec();
///
/// assert_eq!(classificar_linha(&cabecalho), TipoDeLinha::Cabecalho);
/// assert_eq!(classificar_linha(&dados), TipoDeLinha::Dados);
/// assert_eq!(classificar_linha(&[]), TipoDeLinha::Vazia);
/// ```
pub fn classificar_linha(linha: &[Celula]) -> TipoDeLinha {
    let nome = celula(linha, COLUNA_NOME);

    if nome.is_vazia() {
        return TipoDeLinha::Vazia;
    }

    let texto = nome.texto();

    if MARCADORES_CABECALHO
        .iter()
        .any(|marcador| texto.contains(marcador))
    {
        TipoDeLinha::Cabecalho
    } else {
        TipoDeLinha::Dados
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatoDePlanilha {
    Excel,
    Csv,
}

fn identificar_formato(path: &Path) -> InformeResult<FormatoDePlanilha> {
    let extensao = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match extensao.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(FormatoDePlanilha::Excel),
        "csv" => Ok(FormatoDePlanilha::Csv),
        _ => Err(InformeError::FormatoNaoSuportado {
            arquivo: path.to_path_buf(),
        }),
    }
}

/// Lê todas as linhas da primeira aba da planilha (cabeçalho incluído).
///
/// Formatos aceitos: `.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods` e `.csv` (delimitado por `;`).
/// Arquivos corrompidos ou ilegíveis retornam erro antes de qualquer agregação.
pub fn carregar_planilha<P>(path: P) -> InformeResult<Vec<Linha>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let linhas = match identificar_formato(path)? {
        FormatoDePlanilha::Excel => ler_excel(path)?,
        FormatoDePlanilha::Csv => ler_csv(path)?,
    };

    info!(arquivo = %path.display(), linhas = linhas.len(), "planilha carregada");

    Ok(linhas)
}

fn ler_excel(path: &Path) -> InformeResult<Vec<Linha>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| InformeError::from_calamine(e, path.to_path_buf()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| InformeError::Planilha {
            arquivo: path.to_path_buf(),
            mensagem: "arquivo sem abas".to_string(),
        })?;

    debug!(aba = %sheet_name, "lendo primeira aba");

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| InformeError::from_calamine(e, path.to_path_buf()))?;

    // O range começa na primeira célula preenchida.
    // Completamos as colunas à esquerda para manter os índices absolutos (coluna D = 3).
    let deslocamento = range.start().map(|(_, coluna)| coluna as usize).unwrap_or(0);

    let linhas = range
        .rows()
        .map(|row| {
            std::iter::repeat_n(Celula::Vazia, deslocamento)
                .chain(row.iter().map(Celula::from))
                .collect()
        })
        .collect();

    Ok(linhas)
}

fn ler_csv(path: &Path) -> InformeResult<Vec<Linha>> {
    let file = File::open(path).map_err(|e| InformeError::IoReader {
        source: e,
        arquivo: PathBuf::from(path),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false) // O cabeçalho é descartado pelo classificador de linhas
        .flexible(true) // Linhas de título e rodapé costumam ter menos colunas
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    // Registros em bytes: planilhas exportadas em Latin-1 não interrompem a leitura
    let mut record = csv::ByteRecord::new();
    let mut linhas = Vec::new();

    while rdr.read_byte_record(&mut record)? {
        let linha: Linha = record
            .iter()
            .map(|campo| Celula::from(String::from_utf8_lossy(campo).as_ref()))
            .collect();
        linhas.push(linha);
    }

    Ok(linhas)
}
