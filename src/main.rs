use campaign_loadtest::error::AppResult;

fn main() -> AppResult<()> {
    campaign_loadtest::entry::run()
}
