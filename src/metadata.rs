use std::collections::HashMap;
use std::sync::LazyLock;

// --- Layout da Planilha de Rendimentos ---

/// Coluna com o nome do beneficiário (0-indexada).
pub const COLUNA_NOME: usize = 3;
/// Coluna com o CPF/CNPJ do beneficiário.
pub const COLUNA_DOCUMENTO: usize = 4;
/// Coluna com o período de apuração (data serial ou texto `DD/MM/AAAA`).
pub const COLUNA_PERIODO: usize = 5;
/// Coluna com o valor bruto do rendimento.
pub const COLUNA_BRUTO: usize = 6;
/// Coluna com o IRRF retido.
pub const COLUNA_IRRF: usize = 7;

/// Marcadores que identificam linhas de cabeçalho na coluna do nome.
pub const MARCADORES_CABECALHO: [&str; 2] = ["Nome", "Proprietário"];

pub const NOMES_DOS_MESES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

// --- Tabelas de Referência ---

/// Natureza de Rendimento (EFD-Reinf, Tabela 01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaturezaRendimento {
    pub codigo: &'static str,
    pub descricao: &'static str,
    pub grupo: &'static str,
    /// Código de receita do DARF. `None` para naturezas isentas.
    pub codigo_receita: Option<&'static str>,
    pub isento: bool,
}

const fn natureza(
    codigo: &'static str,
    descricao: &'static str,
    codigo_receita: &'static str,
    grupo: &'static str,
) -> NaturezaRendimento {
    NaturezaRendimento {
        codigo,
        descricao,
        grupo,
        codigo_receita: Some(codigo_receita),
        isento: false,
    }
}

/// Tabela estática (armazenada no binário).
/// A primeira entrada é o valor padrão de [`buscar_natureza`].
pub static NATUREZAS: [NaturezaRendimento; 14] = [
    natureza("10001", "Rendimento do trabalho com vínculo empregatício", "0561", "Trabalho"),
    natureza("10002", "Rendimento do trabalho sem vínculo empregatício", "0588", "Trabalho"),
    natureza("10003", "Trabalho pago a trabalhador avulso", "0588", "Trabalho"),
    natureza("10004", "Participação nos lucros ou resultados (PLR)", "3562", "Trabalho"),
    NaturezaRendimento {
        codigo: "12001",
        descricao: "Lucros e dividendos",
        grupo: "Capital",
        codigo_receita: None,
        isento: true,
    },
    natureza("12016", "Juros sobre o Capital Próprio", "5706", "Capital"),
    natureza("13001", "Rendimentos de Aforamento", "3208", "Aluguéis/Royalties"),
    natureza("13002", "Rendimentos de Aluguéis, Locação ou Sublocação", "3208", "Aluguéis/Royalties"),
    natureza("13003", "Rendimentos de Arrendamento ou Subarrendamento", "3208", "Aluguéis/Royalties"),
    natureza("13004", "Importâncias pagas por terceiros por conta do locador", "3208", "Aluguéis/Royalties"),
    natureza("13010", "Rendimentos de Direito Autoral", "0588", "Aluguéis/Royalties"),
    natureza("13012", "Rendimentos de Direito de Imagem", "3208", "Aluguéis/Royalties"),
    natureza("13098", "Demais rendimentos de Royalties", "3208", "Aluguéis/Royalties"),
    natureza("13099", "Demais rendimentos de Direito", "3208", "Aluguéis/Royalties"),
];

/// Procura a natureza pelo código exato.
pub fn buscar_natureza_exata(codigo: &str) -> Option<&'static NaturezaRendimento> {
    let codigo = codigo.trim();
    NATUREZAS.iter().find(|natureza| natureza.codigo == codigo)
}

/// Procura a natureza pelo código.
///
/// Códigos vazios ou desconhecidos retornam a primeira entrada da tabela.
/// Este retorno é um sentinela de "natureza não configurada" e não uma correspondência real:
/// use [`buscar_natureza_exata`] quando for preciso distinguir os dois casos.
///
/// ```
/// use informe_rendimentos::buscar_natureza;
///
/// assert_eq!(buscar_natureza("13002").codigo_receita, Some("3208"));
/// assert_eq!(buscar_natureza("").codigo, "10001");
/// assert_eq!(buscar_natureza("99999").codigo, "10001");
/// ```
pub fn buscar_natureza(codigo: &str) -> &'static NaturezaRendimento {
    buscar_natureza_exata(codigo).unwrap_or(&NATUREZAS[0])
}

/// Dados cadastrais mínimos de uma pessoa jurídica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadastroCnpj {
    pub razao_social: &'static str,
    pub nome_fantasia: &'static str,
    pub situacao: &'static str,
    pub municipio: &'static str,
    pub uf: &'static str,
}

// Cadastro local de CNPJs (somente leitura)
pub static CADASTRO_CNPJ: LazyLock<HashMap<&'static str, CadastroCnpj>> = LazyLock::new(|| {
    HashMap::from([(
        "00621930000162",
        CadastroCnpj {
            razao_social: "FED NACIONAL COMUNIDADE EVANGELICA SARA NOSSA TERRA",
            nome_fantasia: "SARA NOSSA TERRA",
            situacao: "ATIVA",
            municipio: "BRASILIA",
            uf: "DF",
        },
    )])
});

/// Consulta o cadastro local pelo CNPJ (somente dígitos).
pub fn consultar_cnpj_local(cnpj: &str) -> Option<&'static CadastroCnpj> {
    CADASTRO_CNPJ.get(cnpj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigos_da_tabela_sao_unicos() {
        let mut codigos: Vec<&str> = NATUREZAS.iter().map(|n| n.codigo).collect();
        codigos.sort_unstable();
        codigos.dedup();
        assert_eq!(codigos.len(), NATUREZAS.len());
    }

    #[test]
    fn naturezas_isentas_nao_tem_codigo_de_receita() {
        for natureza in &NATUREZAS {
            assert_eq!(natureza.isento, natureza.codigo_receita.is_none());
        }
    }

    #[test]
    fn busca_exata_distingue_o_sentinela() {
        assert!(buscar_natureza_exata("10001").is_some());
        assert!(buscar_natureza_exata("").is_none());
        assert!(buscar_natureza_exata("00000").is_none());
        assert_eq!(buscar_natureza_exata(" 12016 ").map(|n| n.codigo_receita), Some(Some("5706")));
    }

    #[test]
    fn busca_com_fallback_para_primeira_entrada() {
        assert_eq!(buscar_natureza("12001").descricao, "Lucros e dividendos");
        assert!(buscar_natureza("12001").isento);
        assert_eq!(buscar_natureza("inexistente"), &NATUREZAS[0]);
    }

    #[test]
    fn cadastro_local() {
        let cadastro = consultar_cnpj_local("00621930000162").unwrap();
        assert_eq!(cadastro.uf, "DF");
        assert!(consultar_cnpj_local("11222333000181").is_none());
    }
}
