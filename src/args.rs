use clap::Parser;
use rand::Rng;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    FontePagadora, InformeError, InformeResult, NaturezaRendimento, REGEX_SEARCH_PLANILHA,
    buscar_natureza_exata,
};

// Estrutura para o Clap processar os argumentos da linha de comando
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Arguments {
    /// Planilhas de rendimentos (.xlsx, .xls, .ods ou .csv delimitado por ';').
    ///
    /// Sem planilhas informadas, o diretório atual é pesquisado por arquivos
    /// cujo nome contenha 'rendimento', 'informe', 'beneficiari' ou 'planilha'.
    planilhas: Vec<PathBuf>,

    /// CNPJ da fonte pagadora (com ou sem máscara)
    #[arg(long, required = true)]
    cnpj: String,

    /// Nome empresarial da fonte pagadora.
    ///
    /// Se omitido, é consultado no cadastro local de CNPJs.
    #[arg(long)]
    razao_social: Option<String>,

    /// Nome do responsável pelas informações
    #[arg(long, required = true)]
    responsavel: String,

    /// Exercício
    #[arg(long, default_value = FontePagadora::EXERCICIO_PADRAO)]
    exercicio: String,

    /// Ano-calendário
    #[arg(long, default_value = FontePagadora::ANO_CALENDARIO_PADRAO)]
    ano_calendario: String,

    /// Código da natureza do rendimento (EFD-Reinf)
    #[arg(short, long, default_value = "13002")]
    natureza: String,

    /// Período de apuração do DARF (MM/AAAA)
    #[arg(long, requires = "darf_vencimento")]
    darf_periodo: Option<String>,

    /// Data de vencimento do DARF (DD/MM/AAAA)
    #[arg(long, requires = "darf_periodo")]
    darf_vencimento: Option<String>,

    /// Valor da multa do DARF
    #[arg(long, default_value_t = 0.0)]
    multa: f64,

    /// Valor dos juros e/ou encargos do DARF
    #[arg(long, default_value_t = 0.0)]
    juros: f64,

    /// Imprimir os valores mês a mês de cada beneficiário
    #[arg(short, long, default_value_t = false)]
    detalhar: bool,

    /// Não gerar o arquivo CSV com as fichas dos beneficiários
    #[arg(long, default_value_t = false)]
    sem_exportar: bool,

    /// Clear screen
    #[arg(short, long, default_value_t = false)]
    clear: bool,

    /// Ativar modo detalhado (verbose)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Parâmetros do DARF informados na linha de comando.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametrosDarf {
    pub periodo_apuracao: String,
    pub data_vencimento: String,
    pub multa: f64,
    pub juros: f64,
}

#[derive(Debug)]
pub struct Config {
    pub clear: bool,
    pub detalhar: bool,
    pub exportar: bool,
    pub verbose: bool,

    // Dados já validados da etapa de identificação
    pub fonte: FontePagadora,
    pub natureza: &'static NaturezaRendimento,
    pub darf: Option<ParametrosDarf>,

    // Lista de planilhas a importar
    pub planilhas: Vec<PathBuf>,

    /// Prefixo dos arquivos gerados.
    pub target: PathBuf,
}

impl Config {
    /// Caminho do CSV exportado para a planilha indicada.
    ///
    /// O hash do caminho evita colisões quando várias planilhas são processadas juntas.
    pub fn to_hash(&self, path: &Path) -> PathBuf {
        let hash = blake3::hash(path.display().to_string().as_bytes());
        let hex = hash.to_hex();
        PathBuf::from(format!("{}-{}.csv", self.target.display(), &hex[..12]))
    }
}

pub fn get_config() -> InformeResult<Config> {
    let args = Arguments::parse();

    // 1. Etapas 1 e 2: fonte pagadora e natureza do rendimento
    let fonte = FontePagadora::new(
        &args.cnpj,
        args.razao_social.as_deref(),
        &args.responsavel,
        &args.exercicio,
        &args.ano_calendario,
    )?;

    let natureza = buscar_natureza_exata(&args.natureza)
        .ok_or_else(|| InformeError::NaturezaDesconhecida(args.natureza.clone()))?;

    // 2. Planilhas informadas ou encontradas no diretório atual
    let planilhas = if args.planilhas.is_empty() {
        let encontradas = search_planilhas(Path::new("."))?;

        println!(" Planilha(s) de rendimentos encontrada(s) no diretório atual:\n");
        encontradas.iter().enumerate().for_each(|(i, path)| {
            println!("{:6}: {}", i + 1, path.display());
        });
        println!();

        encontradas
    } else {
        args.planilhas
    };

    // 3. O clap garante que período e vencimento venham juntos
    let darf = match (args.darf_periodo, args.darf_vencimento) {
        (Some(periodo_apuracao), Some(data_vencimento)) => Some(ParametrosDarf {
            periodo_apuracao,
            data_vencimento,
            multa: args.multa,
            juros: args.juros,
        }),
        _ => None,
    };

    // 4. Geração do Target (Funcional)
    let mut rng = rand::rng();
    let target = format!(
        "ZZZ-{:06}-Informe de Rendimentos",
        rng.random_range(0..999999)
    );

    Ok(Config {
        clear: args.clear,
        detalhar: args.detalhar,
        exportar: !args.sem_exportar,
        verbose: args.verbose,
        fonte,
        natureza,
        darf,
        planilhas,
        target: PathBuf::from(target),
    })
}

/// Procura planilhas de rendimentos no diretório indicado.
pub fn search_planilhas(dir: &Path) -> InformeResult<Vec<PathBuf>> {
    // 1. Leitura funcional do diretório
    let mut planilhas: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(InformeError::Io)?
        .flatten() // Transforma Result<DirEntry> em DirEntry, ignorando erros individuais
        .filter_map(|entry| {
            let path = entry.path();
            let is_match = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|name| REGEX_SEARCH_PLANILHA.is_match(name))
                .unwrap_or_default();

            if path.is_file() && is_match {
                Some(path)
            } else {
                None
            }
        })
        .collect();

    // 2. Validação de existência
    if planilhas.is_empty() {
        return Err(InformeError::NoSpreadsheetFound);
    }

    // 3. Ordenação (alfabética)
    planilhas.sort();

    Ok(planilhas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn busca_planilhas_pelo_nome() {
        let dir = tempfile::tempdir().unwrap();

        for nome in [
            "Rendimentos 2025.xlsx",
            "beneficiarios.csv",
            "Informe IRRF.ods",
            "~$Rendimentos 2025.xlsx",
            "rendimentos.pdf",
            "outros.xlsx",
        ] {
            File::create(dir.path().join(nome)).unwrap();
        }

        let nomes: Vec<String> = search_planilhas(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            nomes,
            vec!["Informe IRRF.ods", "Rendimentos 2025.xlsx", "beneficiarios.csv"]
        );
    }

    #[test]
    fn diretorio_sem_planilhas() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            search_planilhas(dir.path()),
            Err(InformeError::NoSpreadsheetFound)
        ));
    }

    #[test]
    fn argumentos_da_linha_de_comando() {
        let args = Arguments::try_parse_from([
            "informe_rendimentos",
            "--cnpj",
            "00.621.930/0001-62",
            "--responsavel",
            "Fulano",
            "--darf-periodo",
            "12/2025",
            "--darf-vencimento",
            "20/01/2026",
            "a.xlsx",
            "b.csv",
        ])
        .unwrap();

        assert_eq!(args.planilhas.len(), 2);
        assert_eq!(args.natureza, "13002");
        assert_eq!(args.exercicio, "2026");
        assert_eq!(args.darf_periodo.as_deref(), Some("12/2025"));

        // Período sem vencimento é rejeitado pelo clap
        let incompleto = Arguments::try_parse_from([
            "informe_rendimentos",
            "--cnpj",
            "00621930000162",
            "--responsavel",
            "Fulano",
            "--darf-periodo",
            "12/2025",
        ]);
        assert!(incompleto.is_err());
    }
}
