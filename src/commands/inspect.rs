//! # inspect 命令实现
//!
//! 列出 SISSO.out 中各维度模型的描述符、系数与训练误差。
//!
//! ## 依赖关系
//! - 使用 `cli/inspect.rs` 定义的参数
//! - 使用 `parsers/sisso_out.rs`

use crate::cli::inspect::InspectArgs;
use crate::error::Result;
use crate::models::SissoModel;
use crate::parsers::resolve_model_path;
use crate::parsers::sisso_out::{available_dimensions, parse_sisso_content, read_sisso_file};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 描述符行
#[derive(Debug, Clone, Tabled)]
struct DescriptorRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Descriptor")]
    descriptor: String,
    #[tabled(rename = "Coefficient(s)")]
    coefficients: String,
}

/// 执行 inspect 命令
pub fn execute(args: InspectArgs) -> Result<()> {
    let path = resolve_model_path(&args.model);
    let content = read_sisso_file(&path)?;
    let source = path.display().to_string();

    let dimensions = match args.dimension {
        Some(d) => vec![d],
        None => available_dimensions(&content),
    };
    if dimensions.is_empty() {
        output::print_warning(&format!("No models found in '{}'", source));
        return Ok(());
    }

    for dimension in dimensions {
        match parse_sisso_content(&content, &source, dimension, args.tasks) {
            Ok(model) => print_model(&model),
            Err(e) => output::print_failure(&format!("{}D", dimension), &e.to_string()),
        }
    }

    Ok(())
}

fn print_model(model: &SissoModel) {
    output::print_header(&format!("{}D model", model.dimension));
    output::print_info(&format!(
        "Training RMSE {:.6}, MaxAE {:.6}",
        model.training_rmse, model.training_max_ae
    ));

    println!("{}", Table::new(descriptor_rows(model)));

    for (task, fit) in model.fits.iter().enumerate() {
        output::print_info(&format!("Task {} intercept {:.10e}", task + 1, fit.intercept));
    }
}

/// 每个描述符一行，多任务系数以空格分隔
fn descriptor_rows(model: &SissoModel) -> Vec<DescriptorRow> {
    model
        .descriptors
        .iter()
        .enumerate()
        .map(|(i, descriptor)| DescriptorRow {
            index: format!("d{}", i + 1),
            descriptor: descriptor.clone(),
            coefficients: model
                .fits
                .iter()
                .map(|fit| format!("{:.6e}", fit.coefficients[i]))
                .collect::<Vec<_>>()
                .join("  "),
        })
        .collect()
}
