//! Greedy cheapest-first allocation of recharge energy.

/// Distributes `required_kwh` across slots, cheapest price first.
///
/// Each slot receives at most its capacity. Equal prices are visited in slot
/// order: the sort key is `(price, index)`, so the result does not depend on
/// sort stability. Whatever cannot be placed is left unallocated.
///
/// # Arguments
///
/// * `prices` - Price per slot
/// * `capacities_kwh` - Energy each slot can absorb
/// * `required_kwh` - Total energy to place
///
/// # Returns
///
/// Per-slot allocation in input slot order.
///
/// # Examples
///
/// ```
/// use soc_sim::sim::allocation::allocate_cheapest_first;
///
/// let alloc = allocate_cheapest_first(&[30.0, 10.0, 20.0], &[500.0, 500.0, 500.0], 700.0);
/// assert_eq!(alloc, vec![0.0, 500.0, 200.0]);
/// ```
pub fn allocate_cheapest_first(prices: &[f64], capacities_kwh: &[f64], required_kwh: f64) -> Vec<f64> {
    let n = prices.len().min(capacities_kwh.len());
    let mut allocation = vec![0.0; n];
    if required_kwh <= 0.0 {
        return allocation;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| prices[a].total_cmp(&prices[b]).then(a.cmp(&b)));

    let mut remaining = required_kwh;
    for index in order {
        if remaining <= 0.0 {
            break;
        }
        let add = capacities_kwh[index].max(0.0).min(remaining);
        allocation[index] = add;
        remaining -= add;
    }
    allocation
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn nothing_required() {
        let alloc = allocate_cheapest_first(&[1.0, 2.0], &[5.0, 5.0], 0.0);
        assert_eq!(alloc, vec![0.0, 0.0]);
    }

    #[test]
    fn fills_cheapest_to_capacity_first() {
        let alloc = allocate_cheapest_first(&[5.0, 1.0, 3.0, 2.0], &[4.0, 4.0, 4.0, 4.0], 10.0);
        assert_eq!(alloc, vec![0.0, 4.0, 2.0, 4.0]);
    }

    #[test]
    fn ties_keep_time_order() {
        let alloc = allocate_cheapest_first(&[7.0, 7.0, 7.0], &[3.0, 3.0, 3.0], 4.0);
        assert_eq!(alloc, vec![3.0, 1.0, 0.0]);
    }

    #[test]
    fn insufficient_capacity_allocates_everything_available() {
        let alloc = allocate_cheapest_first(&[1.0, 2.0], &[3.0, 2.5], 100.0);
        assert_abs_diff_eq!(alloc.iter().sum::<f64>(), 5.5);
    }

    #[test]
    fn zero_capacity_slot_is_skipped() {
        let alloc = allocate_cheapest_first(&[0.0, 9.0], &[0.0, 5.0], 2.0);
        assert_eq!(alloc, vec![0.0, 2.0]);
    }

    #[test]
    fn negative_prices_are_filled_first() {
        let alloc = allocate_cheapest_first(&[3.0, -1.0], &[5.0, 5.0], 5.0);
        assert_eq!(alloc, vec![0.0, 5.0]);
    }
}
