use anyhow::Context;
use clap::Parser;
use generator::profile::{generate_dive, DiveConfig};
use generator::template::write_telemetry_csv_file;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use gui_bridge::model::VisualizationModel;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use trackcore::interface::JsonTrajectoryWriter;
use trackcore::prelude::{AltitudeDirection, AxisConvention, CosineLatitude, ReferenceMode};
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Converts vehicle telemetry logs into local-frame trajectories")]
struct Args {
    /// Nine-column telemetry table (CSV)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Write the engine JSON export here
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the renderer scene as JSON here
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// first-point | mean-position
    #[arg(long)]
    reference_mode: Option<ReferenceMode>,
    /// per-record | reference
    #[arg(long)]
    cosine_latitude: Option<CosineLatitude>,
    /// engine-y-up | north-east-down
    #[arg(long)]
    axes: Option<AxisConvention>,
    /// below | above
    #[arg(long)]
    altitude_direction: Option<AltitudeDirection>,
    /// Keep the reference offset instead of starting the track at the origin
    #[arg(long, default_value_t = false)]
    no_anchor: bool,
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Use a generated dive instead of an input table
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 120)]
    samples: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Save the telemetry batch as a table (useful with --synthetic)
    #[arg(long)]
    emit_csv: Option<PathBuf>,
    /// Keep the GUI bridge alive for the visualizer and incoming batches
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    workflow_config.apply(Overrides {
        input: args.input.clone(),
        output: args.output.clone(),
        scene: args.scene.clone(),
        pretty: args.pretty,
        reference_mode: args.reference_mode,
        cosine_latitude: args.cosine_latitude,
        axis_convention: args.axes,
        altitude_direction: args.altitude_direction,
        no_anchor: args.no_anchor,
    });

    let runner = Runner::new(workflow_config.clone());

    let records = if args.synthetic {
        generate_dive(&DiveConfig {
            samples: args.samples,
            seed: args.seed,
            ..Default::default()
        })?
    } else {
        let input = workflow_config
            .input
            .as_ref()
            .context("no telemetry table given; pass --input or --synthetic")?;
        runner.read_table(input)?
    };

    if let Some(path) = &args.emit_csv {
        write_telemetry_csv_file(path, &records)?;
        info!("telemetry table written to {}", path.display());
    }

    let result = runner.execute(&records)?;
    println!(
        "Projected {} records over {:.1} s ({})",
        result.records.len(),
        result.scene.duration_seconds,
        result.notes.join("; ")
    );

    if let Some(path) = &workflow_config.output {
        let mut writer = JsonTrajectoryWriter::create(path, workflow_config.pretty)
            .with_context(|| format!("creating engine export {}", path.display()))?;
        runner.export(&result, &mut writer)?;
        info!("engine export written to {}", path.display());
    }

    if let Some(path) = &workflow_config.scene {
        let file = File::create(path)
            .with_context(|| format!("creating scene file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &result.scene)
            .with_context(|| format!("writing scene file {}", path.display()))?;
        writer.flush()?;
        info!("scene written to {}", path.display());
    }

    let metrics = runner.metrics();
    info!(
        "records read {}, projected {}, rejected {}",
        metrics.read, metrics.projected, metrics.rejected
    );

    if args.serve {
        let gui_bridge = GuiBridge::new();
        gui_bridge.serve(Arc::new(runner.clone()), gui_bind_address());
        gui_bridge.publish(&VisualizationModel::from_result(&result));
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
