//! # 残差统计
//!
//! RMSE、最大绝对误差与误差最大样本排序。

use crate::models::Prediction;

/// sqrt(mean(r²))；空输入返回 None
pub fn rmse(residuals: &[f64]) -> Option<f64> {
    if residuals.is_empty() {
        return None;
    }
    let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
    Some((sum_sq / residuals.len() as f64).sqrt())
}

/// 最大 |r| 及其下标（并列取最先出现者）
pub fn max_abs(residuals: &[f64]) -> Option<(usize, f64)> {
    residuals
        .iter()
        .map(|r| r.abs())
        .enumerate()
        .fold(None, |best, (i, a)| match best {
            Some((_, b)) if b >= a => best,
            _ => Some((i, a)),
        })
}

/// 按 |残差| 降序排列的 (样本名, |残差|)，并列时保持文件顺序
pub fn worst_offenders(predictions: &[&Prediction]) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = predictions
        .iter()
        .map(|p| (p.sample_id.clone(), p.abs_error()))
        .collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prediction(id: &str, residual: f64) -> Prediction {
        Prediction {
            sample_id: id.to_string(),
            line: 0,
            task: 0,
            observed: 0.0,
            predicted: residual,
            residual,
        }
    }

    #[test]
    fn test_rmse_and_max() {
        let residuals = [1.0, -2.0, 3.0];
        assert_relative_eq!(rmse(&residuals).unwrap(), (14.0f64 / 3.0).sqrt());
        assert_relative_eq!(rmse(&residuals).unwrap(), 2.16025, epsilon = 1e-5);
        assert_eq!(max_abs(&residuals), Some((2, 3.0)));
    }

    #[test]
    fn test_max_abs_of_negative_residual() {
        assert_eq!(max_abs(&[0.5, -4.0, 4.0]), Some((1, 4.0)));
        assert_eq!(max_abs(&[]), None);
        assert_eq!(rmse(&[]), None);
    }

    #[test]
    fn test_worst_offender_order() {
        let preds = [
            prediction("s1", 0.1),
            prediction("s2", -5.0),
            prediction("s3", 2.0),
        ];
        let refs: Vec<&Prediction> = preds.iter().collect();
        assert_eq!(
            worst_offenders(&refs),
            vec![
                ("s2".to_string(), 5.0),
                ("s3".to_string(), 2.0),
                ("s1".to_string(), 0.1),
            ]
        );
    }

    #[test]
    fn test_worst_offenders_keep_duplicate_ids() {
        let preds = [prediction("dup", 1.0), prediction("dup", -3.0)];
        let refs: Vec<&Prediction> = preds.iter().collect();
        let worst = worst_offenders(&refs);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].1, 3.0);
    }
}
