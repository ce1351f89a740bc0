//! Gross/net reconciliation at a fixed withholding rate.

use serde::Serialize;

use crate::data::posting::SalaryKind;

use super::convert::sanitize;

/// Both views of one salary bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GrossNet {
    pub gross: Option<f64>,
    pub net: Option<f64>,
}

pub fn gross_to_net(gross: f64, rate: f64) -> f64 {
    gross * (1.0 - rate)
}

pub fn net_to_gross(net: f64, rate: f64) -> f64 {
    net / (1.0 - rate)
}

/// Derive the missing view from the one the posting published.
///
/// A bound whose derived view overflows is dropped in both views.
pub fn reconcile(value: Option<f64>, kind: SalaryKind, rate: f64) -> GrossNet {
    let Some(value) = value.and_then(sanitize) else {
        return GrossNet::default();
    };
    let (gross, net) = match kind {
        SalaryKind::Gross => (value, gross_to_net(value, rate)),
        SalaryKind::Net => (net_to_gross(value, rate), value),
    };
    match (sanitize(gross), sanitize(net)) {
        (Some(gross), Some(net)) => GrossNet {
            gross: Some(gross),
            net: Some(net),
        },
        _ => GrossNet::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gross_posting_gets_net_view() {
        let views = reconcile(Some(1000.0), SalaryKind::Gross, 0.14);
        assert_eq!(views.gross, Some(1000.0));
        assert!((views.net.unwrap() - 860.0).abs() < 1e-9);
    }

    #[test]
    fn net_posting_gets_gross_view() {
        let views = reconcile(Some(860.0), SalaryKind::Net, 0.14);
        assert!((views.gross.unwrap() - 1000.0).abs() < 1e-9);
        assert_eq!(views.net, Some(860.0));
    }

    #[test]
    fn overflowing_gross_view_drops_the_bound() {
        let views = reconcile(Some(f64::MAX), SalaryKind::Net, 0.14);
        assert_eq!(views, GrossNet::default());

        let views = reconcile(Some(f64::MAX), SalaryKind::Gross, 0.14);
        assert_eq!(views.gross, Some(f64::MAX));
        assert!(views.net.is_some_and(f64::is_finite));
    }

    #[test]
    fn missing_bound_stays_missing() {
        assert_eq!(reconcile(None, SalaryKind::Net, 0.14), GrossNet::default());
    }
}
