use execution_time::ExecutionTime;
use rayon::prelude::*;
use std::{
    path::{Path, PathBuf},
    process,
};
use tracing::{debug, warn};

use informe_rendimentos::{
    Config, Etapa, InformeConsolidado, InformeResult, carregar_planilha, clear_screen,
    exportar_beneficiarios, get_config, imprimir_darf, imprimir_detalhamento_mensal,
    imprimir_diagnosticos, imprimir_documentos, imprimir_resumo, imprimir_versao_do_programa,
    logging,
};

fn main() {
    // A forma mais idiomática de reportar erros ao usuário final sem stack trace técnico
    if let Err(err) = run() {
        eprintln!("\n[ERRO CRÍTICO]: {err}");
        process::exit(1);
    }
}

fn run() -> InformeResult<()> {
    let timer = ExecutionTime::start();

    // 1. Obter Configurações (etapas 1 e 2: fonte pagadora e natureza)
    let config = get_config()?;

    // 2. Setup inicial
    logging::init(config.verbose);
    clear_screen(config.clear)?;
    imprimir_versao_do_programa();

    if config.verbose {
        println!("{:#?}\n", config);
    }

    // 3. Importação das planilhas (Paralelo). Cada planilha é uma análise independente.
    let resultados: Vec<(PathBuf, InformeResult<Etapa>)> = config
        .planilhas
        .par_iter()
        .map(|path| (path.clone(), analisar_planilha(&config, path)))
        .collect();

    let mut importadas = 0;

    // 4. Relatórios (Sequencial, na ordem das planilhas)
    for (path, resultado) in resultados {
        let etapa = match resultado {
            Ok(etapa) => etapa,
            Err(err) => {
                eprintln!(" [ERRO] {}: {err}\n", path.display());
                continue;
            }
        };

        importadas += 1;
        debug!(arquivo = %path.display(), etapa = etapa.nome(), "planilha analisada");

        let Some(agregacao) = etapa.agregacao() else {
            continue;
        };

        let nome = path.display().to_string();
        imprimir_resumo(&config.fonte, config.natureza, agregacao, &nome);

        if config.detalhar {
            imprimir_detalhamento_mensal(agregacao);
        }

        imprimir_diagnosticos(agregacao);
        imprimir_documentos(&InformeConsolidado::new(
            &config.fonte,
            agregacao,
            config.natureza,
        ));

        if config.exportar {
            let output = config.to_hash(&path);
            if let Err(err) = exportar_beneficiarios(agregacao, &output) {
                eprintln!(" [ERRO] {}: {err}\n", output.display());
                continue;
            }
            println!(" Fichas exportadas para: {}\n", output.display());
        }

        // 5. DARF do IRRF retido (etapa 5). Um erro aqui não descarta a importação.
        if let Some(parametros) = &config.darf {
            match etapa.preparar_darf(
                &parametros.periodo_apuracao,
                &parametros.data_vencimento,
                parametros.multa,
                parametros.juros,
            ) {
                Ok(Etapa::Darf { darf, .. }) => {
                    imprimir_darf(&darf);
                    println!(" Documento: {}\n", darf.nome_do_arquivo());
                }
                Ok(outra) => warn!(etapa = outra.nome(), "DARF não gerado"),
                Err(err) => eprintln!(" [ERRO] DARF: {err}\n"),
            }
        }
    }

    if importadas == 0 {
        warn!("nenhuma planilha importada");
        println!(" Nenhuma planilha foi importada.\n");
    }

    timer.print_elapsed_time();

    Ok(())
}

/// Percorre as etapas do fluxo para uma planilha até a revisão dos beneficiários.
fn analisar_planilha(config: &Config, path: &Path) -> InformeResult<Etapa> {
    let linhas = carregar_planilha(path)?;

    Etapa::Identificacao
        .confirmar_fonte(config.fonte.clone())?
        .escolher_natureza(config.natureza.codigo)?
        .importar(&linhas)
}
