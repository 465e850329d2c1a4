use plasticity_viz::dashboard::{Dashboard, DashboardEvent};
use plasticity_viz::pathways::PathwayState;
use plasticity_viz::prng::Prng;
use plasticity_viz::regions::RegionCatalog;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" || args[1] == "help" {
        print_help();
        return;
    }

    let result = match args[1].as_str() {
        "figure" => run_figure(&args[2..]),
        "info" => run_info(&args[2..]),
        "regions" => run_regions(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("plasticity_viz - cross-modal plasticity scene generator");
    println!();
    println!("Usage:");
    println!("  plasticity_viz figure [--regions v1,a1] [--pathway STATE] [--simulate INTENSITY] [--seed N]");
    println!("  plasticity_viz info [--regions v1,a1] [--pathway STATE]");
    println!("  plasticity_viz regions");
    println!();
    println!("Output is JSON on stdout. STATE is one of normal|early|established|advanced.");
    println!("Omitting --regions selects every region.");
}

#[derive(Debug, Default)]
struct Options {
    regions: Option<Vec<String>>,
    pathway: PathwayState,
    simulate: Option<f64>,
    seed: Option<u64>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let mut value = || {
            it.next()
                .cloned()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--regions" => {
                let v = value()?;
                opts.regions = Some(
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            "--pathway" => opts.pathway = value()?.parse()?,
            "--simulate" => {
                let v = value()?;
                opts.simulate = Some(v.parse().map_err(|e| format!("bad intensity {v:?}: {e}"))?);
            }
            "--seed" => {
                let v = value()?;
                opts.seed = Some(v.parse().map_err(|e| format!("bad seed {v:?}: {e}"))?);
            }
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    Ok(opts)
}

fn run_figure(args: &[String]) -> Result<(), String> {
    let opts = parse_options(args)?;
    let catalog = RegionCatalog::new();
    let rng = opts.seed.map(Prng::new).unwrap_or_else(Prng::from_entropy);
    let selection = opts
        .regions
        .unwrap_or_else(|| catalog.ids().into_iter().map(str::to_string).collect());

    let mut dashboard = Dashboard::new(catalog, rng).with_selection(selection);
    dashboard.apply(DashboardEvent::PathwayStateChanged {
        state: opts.pathway,
    });
    if let Some(intensity) = opts.simulate {
        dashboard.set_simulate_intensity(intensity);
        dashboard.apply(DashboardEvent::SimulateClicked);
    }

    let scene = dashboard.current_scene();
    let json = scene.to_json().map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_info(args: &[String]) -> Result<(), String> {
    let opts = parse_options(args)?;
    let dashboard = Dashboard::new(RegionCatalog::new(), Prng::new(1));
    let selection = opts.regions.unwrap_or_default();
    let text = dashboard.request_info_text(selection.as_slice(), opts.pathway);
    let json = serde_json::to_string_pretty(&text).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_regions() -> Result<(), String> {
    let catalog = RegionCatalog::new();
    let regions: Vec<_> = catalog.regions().collect();
    let json = serde_json::to_string_pretty(&regions).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
