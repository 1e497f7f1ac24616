mod helpers;
mod test_api_surface;
mod test_generation_flows;
mod test_user_flows;
