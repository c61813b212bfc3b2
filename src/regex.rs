use regex::Regex;
use std::sync::LazyLock;

/// Regex consolidada seguindo o padrão (?isx)
/// i: case-insensitive
/// s: '.' inclui \n (embora nomes de arquivos raramente tenham \n)
/// x: modo verbose (ignora espaços e permite comentários)
pub static REGEX_SEARCH_PLANILHA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?isx)
        ^ # Início da string
        (?:[^.~$].*)? # Ignora arquivos ocultos e temporários do Excel (~$...)
        (?:
            rendimento   | # Ex: Rendimentos 2025.xlsx
            informe      | # Ex: Informe IRRF.xls
            beneficiari  | # Ex: Beneficiarios-Aluguel.csv
            planilha       # Ex: Planilha de Pagamentos.ods
        )
        .*
        \.(?:xlsx|xlsm|xls|xlsb|ods|csv) # Extensões suportadas
        $ # Fim da string
        ",
    )
    .unwrap()
});

// Regex para limpeza e validação.
// `\D` do crate regex reconhece dígitos Unicode; CPF e CNPJ usam apenas 0-9.
pub static RE_NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());
pub static RE_PERIODO_DARF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{4})$").unwrap());
