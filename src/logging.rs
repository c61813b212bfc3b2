use tracing_subscriber::{EnvFilter, fmt};

/// Inicializa o registro de eventos (tracing).
///
/// O nível vem da variável de ambiente `RUST_LOG`. Sem ela, usa `warn`,
/// ou `debug` quando a opção `--verbose` é informada.
/// Os eventos vão para a saída de erro para não misturar com os relatórios.
///
/// ```no_run
/// use informe_rendimentos::logging;
/// logging::init(false);
/// ```
pub fn init(verbose: bool) {
    let padrao = if verbose { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(padrao));

    // Ignora o erro caso um subscriber global já tenha sido instalado
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_line_number(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Registro de eventos para os testes, capturado pelo harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
