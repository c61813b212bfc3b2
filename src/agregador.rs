use std::{borrow::Cow, collections::HashMap, fmt};
use tracing::{debug, info};

use crate::{
    COLUNA_BRUTO, COLUNA_DOCUMENTO, COLUNA_IRRF, COLUNA_NOME, COLUNA_PERIODO, Celula, TipoDeLinha,
    celula, classificar_linha, formatar_documento, resolver_periodo, somente_digitos,
    validar_documento,
};

/// Ficha anual de um beneficiário: rendimentos e IRRF mês a mês.
///
/// Os campos são privados: a única forma de alterar valores é [`Beneficiario::acumular`],
/// que atualiza o mês e o total na mesma operação.
#[derive(Debug, Clone, PartialEq)]
pub struct Beneficiario {
    documento: String,
    nome: String,
    rendimentos: [f64; 12],
    irrf: [f64; 12],
    total_rendimentos: f64,
    total_irrf: f64,
}

impl Beneficiario {
    pub fn new(documento: impl Into<String>, nome: impl Into<String>) -> Self {
        Beneficiario {
            documento: documento.into(),
            nome: nome.into(),
            rendimentos: [0.0; 12],
            irrf: [0.0; 12],
            total_rendimentos: 0.0,
            total_irrf: 0.0,
        }
    }

    /// Soma os valores no mês indicado (0 = janeiro) e recalcula os totais.
    /// Meses fora do intervalo são lançados em janeiro.
    ///
    /// Os totais são sempre a soma dos doze meses, nunca um acumulador separado:
    /// somas de f64 em ordens diferentes divergem nas últimas casas.
    pub fn acumular(&mut self, mes: usize, bruto: f64, irrf: f64) {
        let mes = if mes < 12 { mes } else { 0 };

        self.rendimentos[mes] += bruto;
        self.irrf[mes] += irrf;
        self.total_rendimentos = self.rendimentos.iter().sum();
        self.total_irrf = self.irrf.iter().sum();
    }

    /// CPF ou CNPJ (somente dígitos), conforme a primeira linha encontrada.
    pub fn documento(&self) -> &str {
        &self.documento
    }

    pub fn documento_formatado(&self) -> String {
        formatar_documento(&self.documento)
    }

    /// Resultado da verificação dos dígitos verificadores.
    ///
    /// Documentos inválidos continuam no resultado para revisão visual.
    pub fn documento_valido(&self) -> bool {
        validar_documento(&self.documento)
    }

    pub fn nome(&self) -> &str {
        &self.nome
    }

    pub fn rendimentos(&self) -> &[f64; 12] {
        &self.rendimentos
    }

    pub fn irrf(&self) -> &[f64; 12] {
        &self.irrf
    }

    pub fn total_rendimentos(&self) -> f64 {
        self.total_rendimentos
    }

    pub fn total_irrf(&self) -> f64 {
        self.total_irrf
    }
}

/// Ocorrências de uma importação que não interrompem o processamento.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostico {
    /// Linha de dados sem nome após a normalização.
    SemNome { linha: usize },
    /// Linha de dados sem CPF/CNPJ: a linha foi descartada.
    SemDocumento { linha: usize, nome: String },
    /// Período não interpretado: valores lançados em janeiro.
    PeriodoInvalido {
        linha: usize,
        nome: String,
        valor: String,
    },
    /// Valor não numérico: considerado zero.
    ValorInvalido {
        linha: usize,
        nome: String,
        coluna: &'static str,
        valor: String,
    },
    /// Mesmo nome com outro CPF/CNPJ: a linha foi somada ao documento encontrado primeiro.
    DocumentoDivergente {
        linha: usize,
        nome: String,
        documento_mantido: String,
        documento_da_linha: String,
    },
}

impl Diagnostico {
    pub fn linha(&self) -> usize {
        match self {
            Diagnostico::SemNome { linha }
            | Diagnostico::SemDocumento { linha, .. }
            | Diagnostico::PeriodoInvalido { linha, .. }
            | Diagnostico::ValorInvalido { linha, .. }
            | Diagnostico::DocumentoDivergente { linha, .. } => *linha,
        }
    }
}

impl fmt::Display for Diagnostico {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostico::SemNome { linha } => {
                write!(f, "Linha {linha}: nome em branco, linha descartada")
            }
            Diagnostico::SemDocumento { linha, nome } => {
                write!(f, "Linha {linha}: <{nome}> sem CPF/CNPJ, linha descartada")
            }
            Diagnostico::PeriodoInvalido { linha, nome, valor } => write!(
                f,
                "Linha {linha}: <{nome}> período de apuração '{valor}' não reconhecido, lançado em janeiro"
            ),
            Diagnostico::ValorInvalido {
                linha,
                nome,
                coluna,
                valor,
            } => write!(
                f,
                "Linha {linha}: <{nome}> {coluna} '{valor}' não numérico, considerado zero"
            ),
            Diagnostico::DocumentoDivergente {
                linha,
                nome,
                documento_mantido,
                documento_da_linha,
            } => write!(
                f,
                "Linha {linha}: <{nome}> com documento {} diferente do já registrado {}, valores somados ao registrado",
                formatar_documento(documento_da_linha),
                formatar_documento(documento_mantido)
            ),
        }
    }
}

/// Resultado de uma importação: fichas na ordem em que os nomes apareceram e diagnósticos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Agregacao {
    pub beneficiarios: Vec<Beneficiario>,
    pub diagnosticos: Vec<Diagnostico>,
    /// Número de linhas classificadas como dados.
    pub linhas_de_dados: usize,
    /// Número de linhas de cabeçalho, rodapé ou em branco.
    pub linhas_ignoradas: usize,
}

impl Agregacao {
    pub fn total_rendimentos(&self) -> f64 {
        self.beneficiarios
            .iter()
            .map(Beneficiario::total_rendimentos)
            .sum()
    }

    pub fn total_irrf(&self) -> f64 {
        self.beneficiarios.iter().map(Beneficiario::total_irrf).sum()
    }

    /// Beneficiários cujo CPF/CNPJ falhou na verificação dos dígitos.
    pub fn documentos_invalidos(&self) -> impl Iterator<Item = &Beneficiario> {
        self.beneficiarios.iter().filter(|b| !b.documento_valido())
    }

    pub fn buscar(&self, nome: &str) -> Option<&Beneficiario> {
        let nome = normalizar_nome(nome);
        self.beneficiarios.iter().find(|b| b.nome == nome)
    }
}

/// Nome sem espaços nas extremidades e em maiúsculas (chave de agrupamento).
pub fn normalizar_nome(nome: &str) -> String {
    nome.trim().to_uppercase()
}

/// Converte um valor monetário da planilha.
///
/// Texto com vírgula segue o padrão brasileiro (`"1.234,56"`): pontos são separadores
/// de milhar e a vírgula é o separador decimal. Célula vazia vale zero.
/// Retorna `None` quando o texto não é numérico.
///
/// A remoção dos pontos é intencional: apenas trocar a vírgula por ponto leria
/// `"1.234,56"` como `1.234`.
///
/// ```
/// use informe_rendimentos::{Celula, converter_valor};
///
/// assert_eq!(converter_valor(&Celula::from("1000,50")), Some(1000.5));
/// assert_eq!(converter_valor(&Celula::from("1.234,56")), Some(1234.56));
/// assert_eq!(converter_valor(&Celula::from("150.10")), Some(150.1));
/// assert_eq!(converter_valor(&Celula::Numero(42.0)), Some(42.0));
/// assert_eq!(converter_valor(&Celula::Vazia), Some(0.0));
/// assert_eq!(converter_valor(&Celula::from("R$ abc")), None);
/// ```
pub fn converter_valor(celula: &Celula) -> Option<f64> {
    let valor = match celula {
        Celula::Numero(valor) => *valor,
        Celula::Vazia => 0.0,
        Celula::Texto(texto) => {
            let texto = texto.trim();

            if texto.is_empty() {
                return Some(0.0);
            }

            let normalizado: Cow<str> = if texto.contains(',') {
                Cow::Owned(texto.replace('.', "").replacen(',', ".", 1))
            } else {
                Cow::Borrowed(texto)
            };

            normalizado.parse::<f64>().ok()?
        }
    };

    // Rejeita "NaN" e "inf", que o parse de f64 aceita
    valor.is_finite().then_some(valor)
}

/// Agrupa as linhas da planilha em fichas de beneficiários.
///
/// Nunca falha: linhas de cabeçalho e em branco são ignoradas, linhas sem nome ou
/// documento são descartadas e valores malformados recebem os padrões documentados.
/// Cada ocorrência é registrada em [`Agregacao::diagnosticos`].
///
/// O agrupamento é feito pelo nome normalizado: linhas com o mesmo nome e CPF/CNPJ
/// diferentes são somadas na ficha criada primeiro.
///
/// ```
/// use informe_rendimentos::{Celula, agregar_beneficiarios};
///
/// let linhas: Vec<Vec<Celula>> = vec![
///     ["", "", "", "Nome", "CPF", "Apuração", "Bruto", "IRRF"].map(Celula::from).to_vec(),
///     ["", "", "", "JOÃO SILVA", "11144477735", "01/2025", "1000,00", "150,00"].map(Celula::from).to_vec(),
///     ["", "", "", "joão silva", "11144477735", "02/2025", "1000,50", "150,10"].map(Celula::from).to_vec(),
/// ];
///
/// let agregacao = agregar_beneficiarios(&linhas);
/// let joao = &agregacao.beneficiarios[0];
///
/// assert_eq!(agregacao.beneficiarios.len(), 1);
/// assert_eq!(joao.nome(), "JOÃO SILVA");
/// assert_eq!(joao.rendimentos()[0], 1000.0);
/// assert_eq!(joao.rendimentos()[1], 1000.5);
/// assert_eq!(joao.total_rendimentos(), 2000.5);
/// ```
pub fn agregar_beneficiarios<L>(linhas: &[L]) -> Agregacao
where
    L: AsRef<[Celula]>,
{
    let mut agregacao = Agregacao::default();
    // Nome normalizado -> posição em `beneficiarios` (preserva a ordem de inserção)
    let mut indice: HashMap<String, usize> = HashMap::new();

    for (idx, linha) in linhas.iter().enumerate() {
        let linha = linha.as_ref();
        let num_linha = idx + 1;

        if classificar_linha(linha) != TipoDeLinha::Dados {
            agregacao.linhas_ignoradas += 1;
            continue;
        }

        agregacao.linhas_de_dados += 1;

        let nome = normalizar_nome(&celula(linha, COLUNA_NOME).texto());
        let documento = somente_digitos(&celula(linha, COLUNA_DOCUMENTO).texto());

        if nome.is_empty() {
            agregacao
                .diagnosticos
                .push(Diagnostico::SemNome { linha: num_linha });
            continue;
        }

        if documento.is_empty() {
            agregacao.diagnosticos.push(Diagnostico::SemDocumento {
                linha: num_linha,
                nome,
            });
            continue;
        }

        let mut ler_valor = |coluna_idx: usize, coluna: &'static str| -> f64 {
            let celula = celula(linha, coluna_idx);
            converter_valor(celula).unwrap_or_else(|| {
                agregacao.diagnosticos.push(Diagnostico::ValorInvalido {
                    linha: num_linha,
                    nome: nome.clone(),
                    coluna,
                    valor: celula.texto().into_owned(),
                });
                0.0
            })
        };

        let bruto = ler_valor(COLUNA_BRUTO, "rendimento bruto");
        let irrf = ler_valor(COLUNA_IRRF, "IRRF");

        let celula_periodo = celula(linha, COLUNA_PERIODO);
        let periodo = resolver_periodo(celula_periodo);

        if !periodo.exato {
            agregacao.diagnosticos.push(Diagnostico::PeriodoInvalido {
                linha: num_linha,
                nome: nome.clone(),
                valor: celula_periodo.texto().into_owned(),
            });
        }

        let posicao = match indice.get(&nome) {
            Some(&posicao) => {
                let existente = &agregacao.beneficiarios[posicao];
                if existente.documento != documento {
                    agregacao
                        .diagnosticos
                        .push(Diagnostico::DocumentoDivergente {
                            linha: num_linha,
                            nome: nome.clone(),
                            documento_mantido: existente.documento.clone(),
                            documento_da_linha: documento,
                        });
                }
                posicao
            }
            None => {
                let posicao = agregacao.beneficiarios.len();
                agregacao
                    .beneficiarios
                    .push(Beneficiario::new(documento, nome.clone()));
                indice.insert(nome, posicao);
                posicao
            }
        };

        agregacao.beneficiarios[posicao].acumular(periodo.mes, bruto, irrf);
    }

    for diagnostico in &agregacao.diagnosticos {
        debug!("{diagnostico}");
    }

    info!(
        beneficiarios = agregacao.beneficiarios.len(),
        linhas_de_dados = agregacao.linhas_de_dados,
        diagnosticos = agregacao.diagnosticos.len(),
        "agregação concluída"
    );

    agregacao
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linha(campos: [&str; 8]) -> Vec<Celula> {
        campos.map(Celula::from).to_vec()
    }

    fn dados(nome: &str, doc: &str, periodo: &str, bruto: &str, irrf: &str) -> Vec<Celula> {
        linha(["", "", "", nome, doc, periodo, bruto, irrf])
    }

    fn aprox(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn cabecalho() -> Vec<Celula> {
        linha([
            "Item",
            "Imóvel",
            "Endereço",
            "Nome do Proprietário",
            "CPF",
            "Apuração",
            "Bruto",
            "IRRF",
        ])
    }

    fn assert_totais_consistentes(b: &Beneficiario) {
        assert_eq!(b.total_rendimentos(), b.rendimentos().iter().sum::<f64>());
        assert_eq!(b.total_irrf(), b.irrf().iter().sum::<f64>());
    }

    #[test]
    fn exemplo_completo_joao_silva() {
        let linhas = vec![
            cabecalho(),
            dados("JOÃO SILVA", "11144477735", "01/2025", "1000,00", "150,00"),
            dados("joão silva", "11144477735", "02/2025", "1000,50", "150,10"),
        ];

        let agregacao = agregar_beneficiarios(&linhas);

        assert_eq!(agregacao.beneficiarios.len(), 1);
        assert!(agregacao.diagnosticos.is_empty());
        assert_eq!(agregacao.linhas_de_dados, 2);
        assert_eq!(agregacao.linhas_ignoradas, 1);

        let joao = &agregacao.beneficiarios[0];
        assert_eq!(joao.nome(), "JOÃO SILVA");
        assert_eq!(joao.documento(), "11144477735");
        assert!(joao.documento_valido());
        assert_eq!(joao.rendimentos()[0], 1000.0);
        assert_eq!(joao.rendimentos()[1], 1000.5);
        assert!(aprox(joao.total_rendimentos(), 2000.5));
        assert!(aprox(joao.total_irrf(), 300.1));
        assert_totais_consistentes(joao);
    }

    #[test]
    fn mesmo_nome_com_documentos_diferentes_mantem_o_primeiro() {
        let linhas = vec![
            dados("Maria Souza", "529.982.247-25", "15/03/2025", "500", "0"),
            dados("MARIA SOUZA ", "11144477735", "15/04/2025", "700", "10"),
        ];

        let agregacao = agregar_beneficiarios(&linhas);

        assert_eq!(agregacao.beneficiarios.len(), 1);
        let maria = &agregacao.beneficiarios[0];
        assert_eq!(maria.documento(), "52998224725");
        assert!(aprox(maria.total_rendimentos(), 1200.0));
        assert!(aprox(maria.total_irrf(), 10.0));
        assert_eq!(maria.rendimentos()[2], 500.0);
        assert_eq!(maria.rendimentos()[3], 700.0);

        assert_eq!(
            agregacao.diagnosticos,
            vec![Diagnostico::DocumentoDivergente {
                linha: 2,
                nome: "MARIA SOUZA".into(),
                documento_mantido: "52998224725".into(),
                documento_da_linha: "11144477735".into(),
            }]
        );
    }

    #[test]
    fn ordem_das_linhas_nao_altera_os_totais() {
        let linhas = vec![
            dados("ANA", "11144477735", "01/2025", "100,10", "1,50"),
            dados("BRUNO", "52998224725", "02/2025", "200,20", "2,50"),
            dados("ANA", "11144477735", "01/2025", "300,30", "3,50"),
            dados("CARLA", "11222333000181", "12/2025", "400,40", "4,50"),
            dados("BRUNO", "52998224725", "03/2025", "500,50", "5,50"),
        ];

        let mut invertidas = linhas.clone();
        invertidas.reverse();
        invertidas.insert(2, cabecalho());

        let original = agregar_beneficiarios(&linhas);
        let reordenado = agregar_beneficiarios(&invertidas);

        assert_eq!(original.beneficiarios.len(), reordenado.beneficiarios.len());

        for b in &original.beneficiarios {
            let outro = reordenado.buscar(b.nome()).unwrap();
            assert_eq!(b.documento(), outro.documento());
            assert!(aprox(b.total_rendimentos(), outro.total_rendimentos()));
            assert!(aprox(b.total_irrf(), outro.total_irrf()));
            for mes in 0..12 {
                assert!(aprox(b.rendimentos()[mes], outro.rendimentos()[mes]));
                assert!(aprox(b.irrf()[mes], outro.irrf()[mes]));
            }
        }
    }

    #[test]
    fn ordem_de_saida_e_a_primeira_ocorrencia() {
        let linhas = vec![
            dados("ZECA", "11144477735", "01/2025", "1", "0"),
            dados("ALICE", "52998224725", "01/2025", "1", "0"),
            dados("ZECA", "11144477735", "02/2025", "1", "0"),
        ];

        let agregacao = agregar_beneficiarios(&linhas);
        let nomes: Vec<&str> = agregacao.beneficiarios.iter().map(|b| b.nome()).collect();

        assert_eq!(nomes, vec!["ZECA", "ALICE"]);
    }

    #[test]
    fn linhas_sem_documento_sao_descartadas() {
        let linhas = vec![
            dados("PEDRO", "", "01/2025", "100", "0"),
            dados("PAULO", "n/d", "01/2025", "100", "0"),
            dados("   ", "11144477735", "01/2025", "100", "0"),
        ];

        let agregacao = agregar_beneficiarios(&linhas);

        assert!(agregacao.beneficiarios.is_empty());
        // Nome só com espaços é tratado como linha em branco pelo classificador
        assert_eq!(agregacao.linhas_de_dados, 2);
        assert_eq!(agregacao.linhas_ignoradas, 1);
        assert_eq!(
            agregacao.diagnosticos,
            vec![
                Diagnostico::SemDocumento {
                    linha: 1,
                    nome: "PEDRO".into()
                },
                Diagnostico::SemDocumento {
                    linha: 2,
                    nome: "PAULO".into()
                },
            ]
        );
    }

    #[test]
    fn periodo_e_valores_invalidos_usam_padroes() {
        let linhas = vec![dados("LUCAS", "11144477735", "", "abc", "10,00")];

        let agregacao = agregar_beneficiarios(&linhas);
        let lucas = &agregacao.beneficiarios[0];

        assert_eq!(lucas.rendimentos()[0], 0.0);
        assert_eq!(lucas.irrf()[0], 10.0);
        assert_totais_consistentes(lucas);

        assert_eq!(agregacao.diagnosticos.len(), 2);
        assert!(matches!(
            &agregacao.diagnosticos[0],
            Diagnostico::ValorInvalido { coluna: "rendimento bruto", valor, .. } if valor == "abc"
        ));
        assert!(matches!(
            &agregacao.diagnosticos[1],
            Diagnostico::PeriodoInvalido { linha: 1, .. }
        ));
    }

    #[test]
    fn celulas_numericas_da_planilha() {
        let linhas = vec![vec![
            Celula::Vazia,
            Celula::Vazia,
            Celula::Vazia,
            Celula::from(" Empresa X Ltda "),
            Celula::Numero(11222333000181.0),
            Celula::Numero(45323.0),
            Celula::Numero(2500.75),
            Celula::Numero(37.5),
        ]];

        let agregacao = agregar_beneficiarios(&linhas);
        let empresa = &agregacao.beneficiarios[0];

        assert_eq!(empresa.nome(), "EMPRESA X LTDA");
        assert_eq!(empresa.documento(), "11222333000181");
        assert_eq!(empresa.documento_formatado(), "11.222.333/0001-81");
        assert_eq!(empresa.rendimentos()[1], 2500.75);
        assert_eq!(empresa.irrf()[1], 37.5);
        assert!(agregacao.diagnosticos.is_empty());
    }

    #[test]
    fn documentos_invalidos_permanecem_no_resultado() {
        let linhas = vec![
            dados("VALIDO", "11144477735", "01/2025", "1", "0"),
            dados("INVALIDO", "11144477736", "01/2025", "1", "0"),
        ];

        let agregacao = agregar_beneficiarios(&linhas);
        let invalidos: Vec<&str> = agregacao.documentos_invalidos().map(|b| b.nome()).collect();

        assert_eq!(agregacao.beneficiarios.len(), 2);
        assert_eq!(invalidos, vec!["INVALIDO"]);
    }

    #[test]
    fn totais_gerais() {
        let linhas = vec![
            dados("A", "11144477735", "01/2025", "100", "10"),
            dados("B", "52998224725", "05/2025", "50,5", "5,25"),
        ];

        let agregacao = agregar_beneficiarios(&linhas);

        assert!(aprox(agregacao.total_rendimentos(), 150.5));
        assert!(aprox(agregacao.total_irrf(), 15.25));
    }

    #[test]
    fn entrada_vazia() {
        let linhas: Vec<Vec<Celula>> = Vec::new();
        assert_eq!(agregar_beneficiarios(&linhas), Agregacao::default());
    }

    #[test]
    fn acumular_fora_do_intervalo_vai_para_janeiro() {
        let mut b = Beneficiario::new("11144477735", "X");
        b.acumular(12, 10.0, 1.0);
        b.acumular(3, 5.0, 0.5);
        assert_eq!(b.rendimentos()[0], 10.0);
        assert_eq!(b.rendimentos()[3], 5.0);
        assert_totais_consistentes(&b);
    }

    #[test]
    fn totais_iguais_a_soma_dos_meses_com_centavos() {
        let lancamentos = [
            (10, 7131.07),
            (10, 2049.98),
            (11, 4684.35),
            (6, 3667.2),
            (1, 554.64),
            (0, 2934.69),
        ];

        let mut b = Beneficiario::new("11144477735", "X");
        for (mes, valor) in lancamentos {
            b.acumular(mes, valor, valor / 10.0);
            assert_totais_consistentes(&b);
        }

        assert!(aprox(b.total_rendimentos(), 21021.93));
    }

    #[test]
    fn nome_so_com_espacos_gera_diagnostico() {
        // Célula de texto montada sem passar por `Celula::from`
        let mut linha = dados("X", "11144477735", "01/2025", "100", "0");
        linha[COLUNA_NOME] = Celula::Texto("   ".to_string());

        let agregacao = agregar_beneficiarios(&[linha]);

        assert!(agregacao.beneficiarios.is_empty());
        assert_eq!(agregacao.linhas_de_dados, 1);
        assert_eq!(
            agregacao.diagnosticos,
            vec![Diagnostico::SemNome { linha: 1 }]
        );
        assert_eq!(agregacao.diagnosticos[0].linha(), 1);
    }

    #[test]
    fn documento_com_digitos_nao_ascii_e_descartado() {
        let linhas = vec![dados("ANA", "１１１４４４７７７３５", "01/2025", "100", "0")];

        let agregacao = agregar_beneficiarios(&linhas);

        assert!(agregacao.beneficiarios.is_empty());
        assert_eq!(
            agregacao.diagnosticos,
            vec![Diagnostico::SemDocumento {
                linha: 1,
                nome: "ANA".into()
            }]
        );
    }

    #[test]
    fn converter_valores() {
        assert_eq!(converter_valor(&Celula::from("  -150,00 ")), Some(-150.0));
        assert_eq!(converter_valor(&Celula::from("NaN")), None);
        assert_eq!(converter_valor(&Celula::from("inf")), None);
        assert_eq!(converter_valor(&Celula::Numero(f64::NAN)), None);
        assert_eq!(converter_valor(&Celula::from("1.000.000,01")), Some(1_000_000.01));
    }
}
