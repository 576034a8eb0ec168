use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Select;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Attachments;
use crate::domain::models::ExecutionPhase;
use crate::domain::models::ExecutionResult;
use crate::domain::models::ExecutionStatus;
use crate::domain::models::Framework;
use crate::domain::models::ModelConfig;
use crate::domain::models::Provider;
use crate::domain::models::Workspace;
use crate::domain::services::agents::ExplainerAgent;
use crate::domain::services::agents::LearningAgent;
use crate::domain::services::Gallery;
use crate::domain::services::GenerationPipeline;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::sandbox::Sandbox;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn framework() -> Result<Framework> {
    let text = Config::get(ConfigKey::Framework);
    match Framework::parse(&text) {
        Some(framework) => return Ok(framework),
        None => bail!(format!("Unknown framework {text}")),
    }
}

fn model_config() -> Result<(&'static Provider, ModelConfig)> {
    let provider = Provider::find(&Config::get(ConfigKey::Provider))?;
    let config = provider.model_config(
        &Config::get(ConfigKey::Model),
        &Config::get(ConfigKey::ApiKey),
    );

    return Ok((provider, config));
}

async fn build_pipeline() -> Result<GenerationPipeline> {
    let (provider, config) = model_config()?;
    let backend = BackendManager::get(provider.backend);
    backend.health_check(&config).await?;

    return Ok(GenerationPipeline::new(backend, config, framework()?));
}

fn gallery() -> Gallery {
    let dir = Config::get(ConfigKey::GalleryDir);
    if dir.is_empty() {
        return Gallery::default();
    }

    return Gallery::new(path::PathBuf::from(dir));
}

fn attachments_from(matches: &ArgMatches) -> Attachments {
    return Attachments {
        file_name: matches.get_one::<String>("file").cloned(),
        audio_name: matches.get_one::<String>("audio").cloned(),
    };
}

fn print_section(title: &str, body: &str) {
    println!("\n{}", Paint::new(title).underline().bold());
    println!("{body}");
}

/// Every failure category gets its own message; nothing fails silently.
fn print_execution(res: &ExecutionResult) {
    match res.status {
        ExecutionStatus::Completed => {
            if !res.stdout.is_empty() {
                print_section("OUTPUT", &res.stdout);
            }
            if !res.stderr.is_empty() {
                print_section(&Paint::red("SCRIPT ERROR").to_string(), &res.stderr);
            } else {
                println!("\n{}", Paint::green("Script finished cleanly."));
            }
        }
        ExecutionStatus::InstallFailed => {
            print_section(&Paint::red("DEPENDENCY INSTALL FAILED").to_string(), &res.stderr);
        }
        ExecutionStatus::TimedOut(ExecutionPhase::Install) => {
            println!("\n{}", Paint::red("Dependency install timed out."));
        }
        ExecutionStatus::TimedOut(ExecutionPhase::Run) => {
            println!("\n{}", Paint::red("Script execution timed out."));
        }
        ExecutionStatus::SandboxFailed => {
            print_section(&Paint::red("SANDBOX FAILURE").to_string(), &res.stderr);
        }
    }
}

async fn run_current(sandbox: &Sandbox, workspace: &mut Workspace) -> ExecutionResult {
    let code = workspace
        .current_artifact()
        .map(|e| return e.source_code.to_string())
        .unwrap_or_default();

    let res = sandbox.execute(&code).await;
    print_execution(&res);
    workspace.last_execution = Some(res.clone());

    return res;
}

async fn command_generate(matches: &ArgMatches) -> Result<()> {
    let query = matches.get_one::<String>("query").unwrap();
    let attachments = attachments_from(matches);
    let should_run = matches.get_flag("run");
    let should_fix = matches.get_flag("fix");
    let should_learn = matches.get_flag("learn");
    let chat = matches.get_flag("chat");

    let pipeline = build_pipeline().await?;
    let mut workspace = Workspace::new(query, framework()?);

    println!("Brainstorming interactive features...");
    let res = pipeline.generate(&mut workspace, &attachments).await;
    if let Err(err) = res {
        // Completed stages stay visible for debugging before the abort
        // surfaces.
        if let Some(ideas) = &workspace.config_ideas {
            print_section("CONFIGURATION IDEAS", ideas);
        }
        if let Some(plan) = &workspace.plan {
            print_section("GENERATION PLAN", plan);
        }
        return Err(err);
    }

    print_section("CONFIGURATION IDEAS", workspace.config_ideas.as_deref().unwrap());
    print_section("GENERATION PLAN", workspace.plan.as_deref().unwrap());
    print_section("GENERATED SCRIPT", &workspace.current_artifact().unwrap().source_code);

    let sandbox = Sandbox::default();
    if should_run {
        let res = run_current(&sandbox, &mut workspace).await;

        if !res.is_clean() && should_fix && res.status == ExecutionStatus::Completed {
            println!("\n{}", Paint::yellow("Attempting one self-correction cycle..."));
            let current_code = workspace.current_artifact().unwrap().source_code.to_string();
            let artifact = pipeline.correct(&current_code, &res.stderr, &attachments).await;
            print_section("CORRECTED SCRIPT", &artifact.source_code);
            workspace.push_artifact(artifact);

            run_current(&sandbox, &mut workspace).await;
        }
    }

    if should_learn {
        let (provider, config) = model_config()?;
        let backend = BackendManager::get(provider.backend);
        let agent = LearningAgent::new(config, workspace.framework);

        let content = agent
            .run(
                &backend,
                &workspace.current_artifact().unwrap().source_code,
                &workspace.query,
                workspace.config_ideas.as_deref(),
                workspace.plan.as_deref(),
            )
            .await?;
        print_section("LEARNING MATERIALS", &content);
    }

    if chat {
        refinement_loop(&pipeline, &sandbox, &mut workspace, &attachments, should_run).await?;
    }

    return Ok(());
}

/// Interactive chat refinement: each request produces a new artifact
/// version, and the prompt context carries a bounded window of prior
/// exchanges.
async fn refinement_loop(
    pipeline: &GenerationPipeline,
    sandbox: &Sandbox,
    workspace: &mut Workspace,
    attachments: &Attachments,
    should_run: bool,
) -> Result<()> {
    loop {
        let request: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Modification request (empty to finish)")
            .allow_empty(true)
            .interact_text()?;
        if request.trim().is_empty() {
            return Ok(());
        }

        let artifact = pipeline.refine(workspace, &request, attachments).await;
        print_section("UPDATED SCRIPT", &artifact.source_code);

        workspace.record_exchange(&request, &artifact.source_code);
        workspace.push_artifact(artifact);

        if should_run {
            run_current(sandbox, workspace).await;
        }
    }
}

async fn command_run(matches: &ArgMatches) -> Result<()> {
    let file = matches.get_one::<String>("script").unwrap();
    let code = fs::read_to_string(file).await?;

    let res = Sandbox::default().execute(&code).await;
    print_execution(&res);

    return Ok(());
}

async fn command_learn(matches: &ArgMatches) -> Result<()> {
    let file = matches.get_one::<String>("script").unwrap();
    let query = matches
        .get_one::<String>("query")
        .cloned()
        .unwrap_or_else(|| return format!("The simulation in {file}"));
    let code = fs::read_to_string(file).await?;

    let (provider, config) = model_config()?;
    let backend = BackendManager::get(provider.backend);
    backend.health_check(&config).await?;

    let agent = LearningAgent::new(config, framework()?);
    let content = agent.run(&backend, &code, &query, None, None).await?;
    println!("{content}");

    return Ok(());
}

async fn command_explain(matches: &ArgMatches) -> Result<()> {
    let file = matches.get_one::<String>("script").unwrap();
    let code = fs::read_to_string(file).await?;

    let (provider, config) = model_config()?;
    let backend = BackendManager::get(provider.backend);
    backend.health_check(&config).await?;

    let agent = ExplainerAgent::new(config, framework()?);
    let content = agent.run(&backend, &code).await?;
    println!("{content}");

    return Ok(());
}

fn format_gallery_entry(entry: &crate::domain::services::GalleryEntry) -> String {
    return format!(
        "- ({}) {} [{} / {}] {}",
        entry.filename,
        entry.metadata.title,
        entry.metadata.framework,
        entry.metadata.difficulty,
        entry.metadata.description,
    );
}

async fn command_gallery(matches: &ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("dir", _)) => {
            let dir = gallery().gallery_dir.to_string_lossy().to_string();
            println!("{dir}");
        }
        Some(("list", _)) => {
            let entries = gallery().list().await?;
            if entries.is_empty() {
                println!("The gallery is empty. Add your first example with `simforge gallery add`!");
                return Ok(true);
            }

            for entry in entries.iter() {
                println!("{}", format_gallery_entry(entry));
                if !entry.metadata.features.is_empty() {
                    println!("    Features: {}", entry.metadata.features.join(", "));
                }
            }
        }
        Some(("open", open_matches)) => {
            let gallery = gallery();
            let filename = match open_matches.get_one::<String>("id") {
                Some(id) => id.to_string(),
                None => {
                    let entries = gallery.list().await?;
                    if entries.is_empty() {
                        println!("The gallery is empty. Add your first example with `simforge gallery add`!");
                        return Ok(true);
                    }

                    let options = entries
                        .iter()
                        .map(|entry| return format_gallery_entry(entry))
                        .collect::<Vec<String>>();

                    let idx = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt("Which example would you like to open?")
                        .default(0)
                        .items(&options)
                        .interact_opt()?
                        .unwrap();

                    entries[idx].filename.to_string()
                }
            };

            let code = gallery.load_code(&filename).await?;
            println!("{code}");
        }
        Some(("add", add_matches)) => {
            let file = add_matches.get_one::<String>("script").unwrap();
            let query = add_matches.get_one::<String>("query").unwrap();
            let code = fs::read_to_string(file).await?;

            // Back-annotate the known-good script with plausible ideas and
            // a plan so its gallery metadata matches generated entries.
            let pipeline = build_pipeline().await?;
            let (config_ideas, plan) = pipeline
                .generate_from_existing(&code, query, &Attachments::none())
                .await?;

            let filename = gallery()
                .add(
                    query,
                    &config_ideas,
                    &plan,
                    &code,
                    framework()?,
                    add_matches.get_one::<String>("title").map(|e| return e.as_str()),
                    add_matches
                        .get_one::<String>("description")
                        .map(|e| return e.as_str()),
                    add_matches
                        .get_one::<String>("difficulty")
                        .map(|e| return e.as_str()),
                )
                .await?;

            println!("Added {filename} to the gallery.");
        }
        Some(("delete", delete_matches)) => {
            let filename = delete_matches.get_one::<String>("id").unwrap();
            gallery().delete(filename).await?;
            println!("Deleted {filename}");
        }
        _ => {
            return Ok(false);
        }
    }

    return Ok(true);
}

fn command_models() {
    for provider in Provider::all() {
        println!(
            "{} (backend: {}, key: ${})",
            Paint::new(provider.name).bold(),
            provider.backend,
            provider.api_key_env
        );

        for model in provider.models {
            println!(
                "- {} — {} [cost: {}, max {} tokens] {}",
                model.id, model.display_name, model.cost, model.max_tokens, model.description
            );
        }
        println!();
    }
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

fn arg_for_key(key: ConfigKey, env_name: &'static str, help: String) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env_name)
        .num_args(1)
        .help(help)
        .global(true);
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_generate() -> Command {
    return Command::new("generate")
        .about("Generate a simulation script from a natural language description.")
        .arg(
            Arg::new("query")
                .help("What to simulate, in plain language.")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .help("Execute the generated script in the sandbox.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fix")
                .long("fix")
                .help("On a script error, run one self-correction cycle and execute again. Requires --run.")
                .action(ArgAction::SetTrue)
                .requires("run"),
        )
        .arg(
            Arg::new("chat")
                .long("chat")
                .help("Keep refining the script interactively after generation.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("learn")
                .long("learn")
                .help("Also produce educational material about the generated script.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .help("Name of a file accompanying the request. Only the name is shared with the model.")
                .num_args(1),
        )
        .arg(
            Arg::new("audio")
                .long("audio")
                .help("Name of an audio clip accompanying the request. Only the name is shared with the model.")
                .num_args(1),
        );
}

fn subcommand_run() -> Command {
    return Command::new("run")
        .about("Execute a Python script in the sandbox with inferred dependencies.")
        .arg(
            Arg::new("script")
                .help("Path to the script to execute.")
                .required(true)
                .num_args(1),
        );
}

fn subcommand_learn() -> Command {
    return Command::new("learn")
        .about("Generate educational material about a simulation script.")
        .arg(
            Arg::new("script")
                .help("Path to the script to study.")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .help("The original request the script was generated from.")
                .num_args(1),
        );
}

fn subcommand_explain() -> Command {
    return Command::new("explain")
        .about("Explain how a simulation script works.")
        .arg(
            Arg::new("script")
                .help("Path to the script to explain.")
                .required(true)
                .num_args(1),
        );
}

fn subcommand_gallery() -> Command {
    return Command::new("gallery")
        .about("Manage the gallery of example simulations.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the gallery directory path."))
        .subcommand(Command::new("list").about("List all gallery examples with their metadata."))
        .subcommand(
            Command::new("open")
                .about("Print an example's script. Omit the id to pick interactively.")
                .arg(
                    clap::Arg::new("id")
                        .short('i')
                        .long("id")
                        .help("Example filename")
                        .required(false),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a script to the gallery, back-annotating ideas and a plan for it.")
                .arg(
                    Arg::new("script")
                        .help("Path to the script to add.")
                        .required(true)
                        .num_args(1),
                )
                .arg(
                    Arg::new("query")
                        .long("query")
                        .help("The request this script answers.")
                        .required(true)
                        .num_args(1),
                )
                .arg(Arg::new("title").long("title").num_args(1).help("Gallery title."))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .num_args(1)
                        .help("Gallery description."),
                )
                .arg(
                    Arg::new("difficulty")
                        .long("difficulty")
                        .num_args(1)
                        .help("Difficulty label.")
                        .value_parser(PossibleValuesParser::new(["Beginner", "Intermediate", "Advanced"])),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a user-generated example from the gallery.")
                .arg(
                    clap::Arg::new("id")
                        .short('i')
                        .long("id")
                        .help("Example filename")
                        .required(true),
                ),
        );
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("simforge")
        .about(about)
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_generate())
        .subcommand(subcommand_run())
        .subcommand(subcommand_learn())
        .subcommand(subcommand_explain())
        .subcommand(subcommand_gallery())
        .subcommand(Command::new("models").about("List the known providers and their models."))
        .subcommand(subcommand_config())
        .subcommand(subcommand_completions())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("SIMFORGE_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Provider.to_string())
                .short('p')
                .long(ConfigKey::Provider.to_string())
                .env("SIMFORGE_PROVIDER")
                .num_args(1)
                .help(format!(
                    "The completion provider to use. [default: {}]",
                    Config::default(ConfigKey::Provider)
                ))
                .value_parser(PossibleValuesParser::new(Provider::names()))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Model.to_string())
                .short('m')
                .long(ConfigKey::Model.to_string())
                .env("SIMFORGE_MODEL")
                .num_args(1)
                .help("The model to consume on the provider. Defaults to the provider's first catalogue model.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Framework.to_string())
                .short('f')
                .long(ConfigKey::Framework.to_string())
                .env("SIMFORGE_FRAMEWORK")
                .num_args(1)
                .help(format!(
                    "Target simulation framework. [default: {}]",
                    Config::default(ConfigKey::Framework)
                ))
                .value_parser(PossibleValuesParser::new(Framework::VARIANTS))
                .global(true),
        )
        .arg(arg_for_key(
            ConfigKey::ApiKey,
            "SIMFORGE_API_KEY",
            "API key for the provider. Falls back to the provider's own environment variable."
                .to_string(),
        ))
        .arg(arg_for_key(
            ConfigKey::GalleryDir,
            "SIMFORGE_GALLERY_DIR",
            "Directory holding the examples gallery. Defaults to the platform data directory."
                .to_string(),
        ))
        .arg(arg_for_key(
            ConfigKey::PythonBin,
            "SIMFORGE_PYTHON_BIN",
            format!(
                "Python interpreter used by the sandbox. [default: {}]",
                Config::default(ConfigKey::PythonBin)
            ),
        ))
        .arg(arg_for_key(
            ConfigKey::SandboxInstallTimeout,
            "SIMFORGE_SANDBOX_INSTALL_TIMEOUT",
            format!(
                "Seconds the sandbox may spend installing dependencies. [default: {}]",
                Config::default(ConfigKey::SandboxInstallTimeout)
            ),
        ))
        .arg(arg_for_key(
            ConfigKey::SandboxRunTimeout,
            "SIMFORGE_SANDBOX_RUN_TIMEOUT",
            format!(
                "Seconds a sandboxed script may run. [default: {}]",
                Config::default(ConfigKey::SandboxRunTimeout)
            ),
        ))
        .arg(arg_for_key(
            ConfigKey::HealthCheckTimeout,
            "SIMFORGE_HEALTH_CHECK_TIMEOUT",
            format!(
                "Milliseconds to wait before timing out a provider health check. [default: {}]",
                Config::default(ConfigKey::HealthCheckTimeout)
            ),
        ));
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            command_generate(subcmd_matches).await?;
        }
        Some(("run", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            command_run(subcmd_matches).await?;
        }
        Some(("learn", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            command_learn(subcmd_matches).await?;
        }
        Some(("explain", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            command_explain(subcmd_matches).await?;
        }
        Some(("gallery", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            if !command_gallery(subcmd_matches).await? {
                subcommand_gallery().print_long_help()?;
            }
        }
        Some(("models", _)) => {
            command_models();
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        _ => {}
    }

    return Ok(());
}
