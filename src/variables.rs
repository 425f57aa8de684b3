//! Allowed values published by the archive for each ERA5 dataset.

pub const PRESSURE_LEVEL_VARIABLES: &[&str] = &[
    "divergence",
    "fraction_of_cloud_cover",
    "geopotential",
    "ozone_mass_mixing_ratio",
    "potential_vorticity",
    "relative_humidity",
    "specific_cloud_ice_water_content",
    "specific_cloud_liquid_water_content",
    "specific_humidity",
    "specific_rain_water_content",
    "specific_snow_water_content",
    "temperature",
    "u_component_of_wind",
    "v_component_of_wind",
    "vertical_velocity",
    "vorticity",
];

pub const SINGLE_LEVEL_VARIABLES: &[&str] = &[
    "100m_u_component_of_wind",
    "100m_v_component_of_wind",
    "10m_u_component_of_neutral_wind",
    "10m_u_component_of_wind",
    "10m_v_component_of_neutral_wind",
    "10m_v_component_of_wind",
    "10m_wind_gust_since_previous_post_processing",
    "2m_dewpoint_temperature",
    "2m_temperature",
    "boundary_layer_dissipation",
    "boundary_layer_height",
    "charnock",
    "clear_sky_direct_solar_radiation_at_surface",
    "cloud_base_height",
    "convective_available_potential_energy",
    "convective_inhibition",
    "convective_precipitation",
    "convective_rain_rate",
    "convective_snowfall",
    "evaporation",
    "forecast_albedo",
    "friction_velocity",
    "geopotential",
    "high_cloud_cover",
    "instantaneous_10m_wind_gust",
    "instantaneous_surface_sensible_heat_flux",
    "k_index",
    "land_sea_mask",
    "large_scale_precipitation",
    "large_scale_rain_rate",
    "large_scale_snowfall",
    "lake_cover",
    "leaf_area_index_high_vegetation",
    "leaf_area_index_low_vegetation",
    "low_cloud_cover",
    "maximum_2m_temperature_since_previous_post_processing",
    "mean_sea_level_pressure",
    "mean_wave_direction",
    "mean_wave_period",
    "medium_cloud_cover",
    "minimum_2m_temperature_since_previous_post_processing",
    "orography",
    "potential_evaporation",
    "precipitation_type",
    "runoff",
    "sea_ice_cover",
    "sea_surface_temperature",
    "significant_height_of_combined_wind_waves_and_swell",
    "skin_temperature",
    "snow_depth",
    "snowfall",
    "soil_temperature_level_1",
    "soil_temperature_level_2",
    "soil_temperature_level_3",
    "soil_temperature_level_4",
    "soil_type",
    "sub_surface_runoff",
    "surface_latent_heat_flux",
    "surface_net_solar_radiation",
    "surface_net_thermal_radiation",
    "surface_pressure",
    "surface_runoff",
    "surface_sensible_heat_flux",
    "surface_solar_radiation_downwards",
    "surface_thermal_radiation_downwards",
    "toa_incident_solar_radiation",
    "top_net_solar_radiation",
    "top_net_thermal_radiation",
    "total_cloud_cover",
    "total_column_ozone",
    "total_column_rain_water",
    "total_column_snow_water",
    "total_column_water",
    "total_column_water_vapour",
    "total_precipitation",
    "total_totals_index",
    "volumetric_soil_water_layer_1",
    "volumetric_soil_water_layer_2",
    "volumetric_soil_water_layer_3",
    "volumetric_soil_water_layer_4",
];

/// Pressure levels in hPa.
pub const PRESSURE_LEVELS: &[u32] = &[
    1, 2, 3, 5, 7, 10, 20, 30, 50, 70, 100, 125, 150, 175, 200, 225, 250, 300, 350, 400, 450, 500,
    550, 600, 650, 700, 750, 775, 800, 825, 850, 875, 900, 925, 950, 975, 1000,
];

/// Hours of the day, `00:00` through `23:00`.
pub fn hours() -> Vec<String> {
    (0..24).map(|hour| format!("{hour:02}:00")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_cover_the_whole_day() {
        let hours = hours();
        assert_eq!(hours.len(), 24);
        assert_eq!(hours.first().map(String::as_str), Some("00:00"));
        assert_eq!(hours.last().map(String::as_str), Some("23:00"));
    }

    #[test]
    fn pressure_levels_are_sorted_and_unique() {
        assert_eq!(PRESSURE_LEVELS.len(), 37);
        assert!(PRESSURE_LEVELS.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
