use crate::datastructures::DesignParameters;

pub fn default_parameters() -> DesignParameters {
    DesignParameters {
        parts_min: 8,
        parts_max: 64,
        total_parts: 64,
        mcs_min: 1,
        mcs_max: 4,
        cores_per_mc: 2,
        budget: 2.0,
        num_parts_interpolate: 4,
    }
}
