//! 命令测试共用的 SISSO 输出、验证集与临时目录

use std::fs;
use std::path::PathBuf;

/// 三任务 2D 模型（O / OH / OOH）
pub const MULTI_TASK_OUT: &str = "\
================================================================================
  2D descriptor (model): 
  RMSE and MaxAE:   0.120000  0.350000
@@@descriptor: 
                      7:[(feat_a+feat_b)]
                     42:[(feat_a*feat_b)]
       coefficients_001:     0.1000000000E+01    0.2000000000E+01
          Intercept_001:     0.5000000000E+00
         RMSE,MaxAE_001:     0.1000000000E+00    0.3000000000E+00
       coefficients_002:    -0.1000000000E+01    0.5000000000E+00
          Intercept_002:     0.3000000000E+01
         RMSE,MaxAE_002:     0.1100000000E+00    0.3200000000E+00
       coefficients_003:     0.2500000000E+00    0.7500000000E+00
          Intercept_003:    -0.1000000000E+01
         RMSE,MaxAE_003:     0.1300000000E+00    0.3500000000E+00
================================================================================
";

/// 与 `MULTI_TASK_OUT` 配套的验证集；边界 `2 4 6` 时残差为
/// s1 0.5, s2 -1.0, s3 0.0, s4 2.0, s5 -0.25
pub const VALIDATION_DATA: &str = "\
materials  dG    feat_a  feat_b
s1         4.0   1.0     1.0
s2         2.0   2.0     1.0
s3         1.0   1.0     2.0
s4         1.0   2.0     2.0
s5         0.25  0.0     4.0
";

/// 进程内唯一的空临时目录
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sissoval_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}
