use tracing::info;

use crate::{
    Agregacao, Celula, Darf, InformeError, InformeResult, NaturezaRendimento,
    agregar_beneficiarios, buscar_natureza_exata, consultar_cnpj_local, formatar_cnpj,
    somente_digitos, validar_cnpj,
};

/// Fonte pagadora dos rendimentos.
///
/// Os campos são imutáveis depois da validação em [`FontePagadora::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontePagadora {
    cnpj: String,
    razao_social: String,
    responsavel: String,
    exercicio: String,
    ano_calendario: String,
}

impl FontePagadora {
    pub const EXERCICIO_PADRAO: &'static str = "2026";
    pub const ANO_CALENDARIO_PADRAO: &'static str = "2025";

    /// Valida o CNPJ (com ou sem máscara) e completa a razão social pelo cadastro local
    /// quando ela não é informada.
    pub fn new(
        cnpj: &str,
        razao_social: Option<&str>,
        responsavel: &str,
        exercicio: &str,
        ano_calendario: &str,
    ) -> InformeResult<Self> {
        let cnpj = somente_digitos(cnpj);

        if cnpj.len() != 14 {
            return Err(InformeError::InvalidCnpj {
                length: cnpj.len(),
                cnpj,
            });
        }

        if !validar_cnpj(&cnpj) {
            return Err(InformeError::CnpjDigitoVerificador {
                cnpj: formatar_cnpj(&cnpj),
            });
        }

        let razao_social = match razao_social.map(str::trim).filter(|r| !r.is_empty()) {
            Some(razao) => razao.to_string(),
            None => consultar_cnpj_local(&cnpj)
                .map(|cadastro| cadastro.razao_social.to_string())
                .ok_or_else(|| InformeError::RazaoSocialNaoEncontrada {
                    cnpj: formatar_cnpj(&cnpj),
                })?,
        };

        let responsavel = responsavel.trim();
        if responsavel.is_empty() {
            return Err(InformeError::Config(
                "Nome do responsável pelas informações não pode ficar em branco".into(),
            ));
        }

        Ok(FontePagadora {
            cnpj,
            razao_social,
            responsavel: responsavel.to_string(),
            exercicio: exercicio.trim().to_string(),
            ano_calendario: ano_calendario.trim().to_string(),
        })
    }

    pub fn cnpj(&self) -> &str {
        &self.cnpj
    }

    pub fn cnpj_formatado(&self) -> String {
        formatar_cnpj(&self.cnpj)
    }

    pub fn razao_social(&self) -> &str {
        &self.razao_social
    }

    pub fn responsavel(&self) -> &str {
        &self.responsavel
    }

    pub fn exercicio(&self) -> &str {
        &self.exercicio
    }

    pub fn ano_calendario(&self) -> &str {
        &self.ano_calendario
    }
}

/// Etapas do fluxo de geração dos informes.
///
/// Cada transição consome a etapa atual e devolve a próxima, carregando apenas os dados
/// já confirmados. Não há estado compartilhado entre importações: `importar` sempre
/// agrega as linhas recebidas do zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Etapa {
    Identificacao,
    Natureza {
        fonte: FontePagadora,
    },
    Importacao {
        fonte: FontePagadora,
        natureza: &'static NaturezaRendimento,
    },
    Revisao {
        fonte: FontePagadora,
        natureza: &'static NaturezaRendimento,
        agregacao: Agregacao,
    },
    Darf {
        fonte: FontePagadora,
        natureza: &'static NaturezaRendimento,
        agregacao: Agregacao,
        darf: Darf,
    },
}

impl Etapa {
    pub fn numero(&self) -> u8 {
        match self {
            Etapa::Identificacao => 1,
            Etapa::Natureza { .. } => 2,
            Etapa::Importacao { .. } => 3,
            Etapa::Revisao { .. } => 4,
            Etapa::Darf { .. } => 5,
        }
    }

    pub fn nome(&self) -> &'static str {
        match self {
            Etapa::Identificacao => "Fonte Pagadora",
            Etapa::Natureza { .. } => "Natureza do Rendimento",
            Etapa::Importacao { .. } => "Importação da Planilha",
            Etapa::Revisao { .. } => "Revisão dos Beneficiários",
            Etapa::Darf { .. } => "DARF",
        }
    }

    fn transicao_invalida(&self, acao: &'static str) -> InformeError {
        InformeError::TransicaoInvalida {
            etapa: self.nome(),
            acao,
        }
    }

    /// Etapa 1 -> 2.
    pub fn confirmar_fonte(self, fonte: FontePagadora) -> InformeResult<Etapa> {
        match self {
            Etapa::Identificacao => Ok(Etapa::Natureza { fonte }),
            outra => Err(outra.transicao_invalida("confirmar fonte pagadora")),
        }
    }

    /// Etapa 2 -> 3. O código precisa existir na tabela de naturezas.
    pub fn escolher_natureza(self, codigo: &str) -> InformeResult<Etapa> {
        match self {
            Etapa::Natureza { fonte } => {
                let natureza = buscar_natureza_exata(codigo)
                    .ok_or_else(|| InformeError::NaturezaDesconhecida(codigo.to_string()))?;
                Ok(Etapa::Importacao { fonte, natureza })
            }
            outra => Err(outra.transicao_invalida("escolher natureza")),
        }
    }

    /// Etapa 3 -> 4: agrega as linhas da planilha em um conjunto novo de fichas.
    pub fn importar<L>(self, linhas: &[L]) -> InformeResult<Etapa>
    where
        L: AsRef<[Celula]>,
    {
        match self {
            Etapa::Importacao { fonte, natureza } => {
                let agregacao = agregar_beneficiarios(linhas);
                Ok(Etapa::Revisao {
                    fonte,
                    natureza,
                    agregacao,
                })
            }
            outra => Err(outra.transicao_invalida("importar planilha")),
        }
    }

    /// Etapa 4 -> 5: o valor principal é o total de IRRF dos beneficiários.
    pub fn preparar_darf(
        self,
        periodo_apuracao: &str,
        data_vencimento: &str,
        multa: f64,
        juros: f64,
    ) -> InformeResult<Etapa> {
        match self {
            Etapa::Revisao {
                fonte,
                natureza,
                agregacao,
            } => {
                let darf = Darf::gerar(
                    &fonte,
                    natureza,
                    periodo_apuracao,
                    data_vencimento,
                    agregacao.total_irrf(),
                    multa,
                    juros,
                )?;
                Ok(Etapa::Darf {
                    fonte,
                    natureza,
                    agregacao,
                    darf,
                })
            }
            outra => Err(outra.transicao_invalida("preparar DARF")),
        }
    }

    /// Volta uma etapa. Ao sair da revisão, as fichas importadas são descartadas.
    pub fn voltar(self) -> Etapa {
        match self {
            Etapa::Identificacao | Etapa::Natureza { .. } => Etapa::Identificacao,
            Etapa::Importacao { fonte, .. } => Etapa::Natureza { fonte },
            Etapa::Revisao {
                fonte, natureza, ..
            } => Etapa::Importacao { fonte, natureza },
            Etapa::Darf {
                fonte,
                natureza,
                agregacao,
                ..
            } => Etapa::Revisao {
                fonte,
                natureza,
                agregacao,
            },
        }
    }

    /// Descarta todos os dados e recomeça pela identificação da fonte pagadora.
    pub fn nova_analise(self) -> Etapa {
        info!(etapa = self.nome(), "nova análise: dados descartados");
        Etapa::Identificacao
    }

    pub fn agregacao(&self) -> Option<&Agregacao> {
        match self {
            Etapa::Revisao { agregacao, .. } | Etapa::Darf { agregacao, .. } => Some(agregacao),
            _ => None,
        }
    }
}
